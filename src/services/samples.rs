//! Built-in example queries
//!
//! Each one triggers a different class of bottleneck in the analysis service.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleQuery {
    pub name: &'static str,
    pub sql: &'static str,
}

pub const SAMPLES: &[SampleQuery] = &[
    SampleQuery {
        name: "YEAR() Function (Non-SARGABLE)",
        sql: "-- Donor giving with non-SARGABLE date filter
SELECT
  d.descr AS donor_name,
  SUM(gd.amount) AS total_giving
FROM SFDC.dbo.GIVING_DETAIL gd
JOIN COGNOS_DW.dbo.DONOR_DIM d
  ON d.SF_ID = COALESCE(gd.account, gd.contact)
WHERE gd.isdeleted = 'false'
  AND YEAR(gd.posted_date) = 2023
GROUP BY d.descr;",
    },
    SampleQuery {
        name: "COALESCE() Blocking Index",
        sql: "-- Account/Contact pattern
SELECT *
FROM GIVING_DETAIL gd
WHERE COALESCE(gd.account, gd.contact) = @donor_id
  AND gd.posted_date BETWEEN '2023-01-01' AND '2023-12-31';",
    },
    SampleQuery {
        name: "Correlated Subquery",
        sql: "-- Per-row subquery execution
SELECT
  d.descr,
  (SELECT MAX(gd.posted_date)
   FROM GIVING_DETAIL gd
   WHERE COALESCE(gd.account, gd.contact) = d.SF_ID) AS last_gift
FROM DONOR_DIM d;",
    },
    SampleQuery {
        name: "Late Filter on Dimension",
        sql: "-- Business unit filtered after JOIN
SELECT *
FROM GIVING_DETAIL gd
JOIN DESIGNATION dd ON dd.id = gd.designation
WHERE dd.business_unit = 'Dornsife';",
    },
];

/// Look up a sample by 1-based number
pub fn by_number(number: usize) -> Option<&'static SampleQuery> {
    number.checked_sub(1).and_then(|idx| SAMPLES.get(idx))
}
