//! `querylens samples` - list the built-in example queries

use crate::AppState;
use crate::services::SAMPLES;

pub fn run(state: &AppState) {
    println!("Example queries (use with --example N):");
    println!("{}", state.presenter.render_samples());
    for (i, sample) in SAMPLES.iter().enumerate() {
        println!();
        println!("-- #{} {}", i + 1, sample.name);
        println!("{}", sample.sql);
    }
}
