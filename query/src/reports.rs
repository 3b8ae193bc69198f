//! Catalog of the fixed analytical reports.
//!
//! Each [`ReportKind`] owns one or two SQL templates. Which template runs is
//! decided by the filters present on the request, and each template lists the
//! exact parameter names it binds. Unknown report names are not an error: they
//! resolve to a diagnostic query that returns one row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::QueryError;
use crate::models::SqlValue;
use crate::statement::Statement;

/// Row cap for `top-clients` when no positive `limit` is given.
pub const DEFAULT_TOP_CLIENTS_LIMIT: i32 = 5;

/// Optional report filters as they arrive on the query string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterSet {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub month: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub q: Option<String>,
    #[serde(default, rename = "saleId", deserialize_with = "blank_as_none")]
    pub sale_id: Option<i64>,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    // Text keeps its spaces; numbers may be padded.
    match raw.parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl FilterSet {
    fn has_range(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    fn positive_limit(&self) -> Option<i32> {
        self.limit.filter(|limit| *limit > 0)
    }

    /// Value for a template parameter, `None` when the filter is absent.
    fn value(&self, name: &str) -> Option<SqlValue> {
        match name {
            "from" => self.from.clone().map(SqlValue::from),
            "to" => self.to.clone().map(SqlValue::from),
            "year" => self.year.map(SqlValue::from),
            "month" => self.month.map(SqlValue::from),
            "limit" => self.positive_limit().map(SqlValue::from),
            "q" => self.q.clone().map(SqlValue::from),
            "saleId" => self.sale_id.map(SqlValue::from),
            _ => None,
        }
    }
}

/// One SQL variant of a report and the parameters it binds.
#[derive(Debug, PartialEq, Eq)]
pub struct ReportTemplate {
    pub sql: &'static str,
    pub params: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportKind {
    SalesMonthly,
    TopClients,
    SoldCars,
    Profit,
    Employees,
    ServicesSales,
    Unknown(String),
}

/// Entry of the report listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportInfo {
    pub name: &'static str,
    pub filters: &'static [&'static str],
}

impl ReportKind {
    pub const KNOWN: [ReportKind; 6] = [
        ReportKind::SalesMonthly,
        ReportKind::TopClients,
        ReportKind::SoldCars,
        ReportKind::Profit,
        ReportKind::Employees,
        ReportKind::ServicesSales,
    ];

    pub fn parse(name: &str) -> Self {
        match name {
            "sales-monthly" => ReportKind::SalesMonthly,
            "top-clients" => ReportKind::TopClients,
            "sold-cars" => ReportKind::SoldCars,
            "profit" => ReportKind::Profit,
            "employees" => ReportKind::Employees,
            "services-sales" => ReportKind::ServicesSales,
            other => ReportKind::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ReportKind::Unknown(name) => name,
            known => known.known_name().unwrap_or_default(),
        }
    }

    fn known_name(&self) -> Option<&'static str> {
        match self {
            ReportKind::SalesMonthly => Some("sales-monthly"),
            ReportKind::TopClients => Some("top-clients"),
            ReportKind::SoldCars => Some("sold-cars"),
            ReportKind::Profit => Some("profit"),
            ReportKind::Employees => Some("employees"),
            ReportKind::ServicesSales => Some("services-sales"),
            ReportKind::Unknown(_) => None,
        }
    }

    /// Filters that can change the result of this report.
    pub fn filters(&self) -> &'static [&'static str] {
        match self {
            ReportKind::SalesMonthly => &["year", "month"],
            ReportKind::TopClients => &["limit"],
            ReportKind::SoldCars | ReportKind::Profit => &["from", "to"],
            ReportKind::Employees => &["q"],
            ReportKind::ServicesSales => &["saleId"],
            ReportKind::Unknown(_) => &[],
        }
    }

    pub fn info(&self) -> Option<ReportInfo> {
        self.known_name().map(|name| ReportInfo {
            name,
            filters: self.filters(),
        })
    }

    /// Picks the template variant for the given filters.
    pub fn resolve(&self, filters: &FilterSet) -> &'static ReportTemplate {
        match self {
            ReportKind::SalesMonthly => match (filters.year, filters.month) {
                (Some(_), Some(_)) => &SALES_BY_MONTH,
                (Some(_), None) => &SALES_BY_YEAR,
                _ => &SALES_ALL,
            },
            ReportKind::TopClients => {
                if filters.positive_limit().is_some() {
                    &TOP_CLIENTS_LIMITED
                } else {
                    &TOP_CLIENTS_DEFAULT
                }
            }
            ReportKind::SoldCars => {
                if filters.has_range() {
                    &SOLD_CARS_IN_RANGE
                } else {
                    &SOLD_CARS_ALL
                }
            }
            ReportKind::Profit => {
                if filters.has_range() {
                    &PROFIT_DAILY
                } else {
                    &PROFIT_MONTHLY
                }
            }
            ReportKind::Employees => {
                if filters.q.is_some() {
                    &EMPLOYEES_SEARCH
                } else {
                    &EMPLOYEES_ALL
                }
            }
            ReportKind::ServicesSales => {
                if filters.sale_id.is_some() {
                    &SERVICES_FOR_SALE
                } else {
                    &SERVICES_ALL
                }
            }
            ReportKind::Unknown(_) => &UNKNOWN_REPORT,
        }
    }

    /// Resolves the template and binds exactly the parameters it declares.
    pub fn statement(&self, filters: &FilterSet) -> Result<Statement, QueryError> {
        let template = self.resolve(filters);
        template.params.iter().try_fold(
            Statement::new(template.sql),
            |stmt, name| {
                let value = filters
                    .value(name)
                    .ok_or_else(|| QueryError::MissingParameter(name.to_string()))?;
                Ok(stmt.bind(name, value))
            },
        )
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn catalog() -> Vec<ReportInfo> {
    ReportKind::KNOWN.iter().filter_map(ReportKind::info).collect()
}

static SALES_BY_MONTH: ReportTemplate = ReportTemplate {
    sql: "SELECT s.id, s.sale_date, s.final_price, s.client_id, s.car_id \
          FROM sales s \
          WHERE EXTRACT(YEAR FROM s.sale_date) = :year \
            AND EXTRACT(MONTH FROM s.sale_date) = :month \
          ORDER BY s.sale_date",
    params: &["year", "month"],
};

static SALES_BY_YEAR: ReportTemplate = ReportTemplate {
    sql: "SELECT s.id, s.sale_date, s.final_price, s.client_id, s.car_id \
          FROM sales s \
          WHERE EXTRACT(YEAR FROM s.sale_date) = :year \
          ORDER BY s.sale_date",
    params: &["year"],
};

static SALES_ALL: ReportTemplate = ReportTemplate {
    sql: "SELECT s.id, s.sale_date, s.final_price, s.client_id, s.car_id \
          FROM sales s \
          ORDER BY s.sale_date",
    params: &[],
};

static TOP_CLIENTS_LIMITED: ReportTemplate = ReportTemplate {
    sql: "SELECT c.first_name || ' ' || c.last_name AS client, SUM(s.final_price) AS total \
          FROM sales s \
          JOIN clients c ON s.client_id = c.id \
          GROUP BY c.id, client \
          ORDER BY total DESC \
          LIMIT :limit",
    params: &["limit"],
};

static TOP_CLIENTS_DEFAULT: ReportTemplate = ReportTemplate {
    sql: "SELECT c.first_name || ' ' || c.last_name AS client, SUM(s.final_price) AS total \
          FROM sales s \
          JOIN clients c ON s.client_id = c.id \
          GROUP BY c.id, client \
          ORDER BY total DESC \
          LIMIT 5",
    params: &[],
};

static SOLD_CARS_IN_RANGE: ReportTemplate = ReportTemplate {
    sql: "SELECT s.id, s.sale_date, s.final_price, \
                 b.name AS brand, m.name AS model, m.generation AS generation, \
                 m.body_type AS body_type, ca.vin_code AS vin_code, \
                 ca.year_manufacture, ca.mileage, \
                 ca.price AS car_price, ca.status AS car_status \
          FROM sales s \
          JOIN cars ca ON s.car_id = ca.id \
          JOIN models m ON ca.model_id = m.id \
          JOIN brands b ON m.brand_id = b.id \
          WHERE s.sale_date BETWEEN :from::timestamp AND :to::timestamp \
          ORDER BY s.sale_date",
    params: &["from", "to"],
};

static SOLD_CARS_ALL: ReportTemplate = ReportTemplate {
    sql: "SELECT s.id, s.sale_date, s.final_price, \
                 b.name AS brand, m.name AS model, m.generation AS generation, \
                 m.body_type AS body_type, ca.vin_code AS vin_code, \
                 ca.year_manufacture, ca.mileage, \
                 ca.price AS car_price, ca.status AS car_status \
          FROM sales s \
          JOIN cars ca ON s.car_id = ca.id \
          JOIN models m ON ca.model_id = m.id \
          JOIN brands b ON m.brand_id = b.id \
          ORDER BY s.sale_date",
    params: &[],
};

static PROFIT_DAILY: ReportTemplate = ReportTemplate {
    sql: "SELECT date_trunc('day', sale_date) AS day, SUM(final_price) AS total_profit \
          FROM sales \
          WHERE sale_date::date BETWEEN :from::date AND :to::date \
          GROUP BY day \
          ORDER BY day",
    params: &["from", "to"],
};

// Buckets are labelled with the first day of the following month.
static PROFIT_MONTHLY: ReportTemplate = ReportTemplate {
    sql: "SELECT date_trunc('month', sale_date) + INTERVAL '1 month' AS month, \
                 SUM(final_price) AS total_profit \
          FROM sales \
          GROUP BY month \
          ORDER BY month",
    params: &[],
};

static EMPLOYEES_SEARCH: ReportTemplate = ReportTemplate {
    sql: "SELECT first_name, last_name, position, salary \
          FROM employees \
          WHERE first_name ILIKE '%' || :q || '%' \
             OR last_name ILIKE '%' || :q || '%' \
          ORDER BY last_name, first_name",
    params: &["q"],
};

static EMPLOYEES_ALL: ReportTemplate = ReportTemplate {
    sql: "SELECT first_name, last_name, position, salary \
          FROM employees \
          ORDER BY last_name, first_name",
    params: &[],
};

static SERVICES_FOR_SALE: ReportTemplate = ReportTemplate {
    sql: "SELECT a.id, a.appointment_date, a.status, a.final_cost, \
                 s.id AS sale_id, sv.name AS service \
          FROM appointments a \
          JOIN sales s ON a.sale_id = s.id \
          JOIN services sv ON a.service_id = sv.id \
          WHERE s.id = :saleId \
          ORDER BY a.appointment_date",
    params: &["saleId"],
};

static SERVICES_ALL: ReportTemplate = ReportTemplate {
    sql: "SELECT a.id, a.appointment_date, a.status, a.final_cost, \
                 s.id AS sale_id, sv.name AS service \
          FROM appointments a \
          JOIN sales s ON a.sale_id = s.id \
          JOIN services sv ON a.service_id = sv.id \
          ORDER BY a.appointment_date",
    params: &[],
};

static UNKNOWN_REPORT: ReportTemplate = ReportTemplate {
    sql: "SELECT 'Test' AS test",
    params: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn all_templates() -> Vec<&'static ReportTemplate> {
        vec![
            &SALES_BY_MONTH,
            &SALES_BY_YEAR,
            &SALES_ALL,
            &TOP_CLIENTS_LIMITED,
            &TOP_CLIENTS_DEFAULT,
            &SOLD_CARS_IN_RANGE,
            &SOLD_CARS_ALL,
            &PROFIT_DAILY,
            &PROFIT_MONTHLY,
            &EMPLOYEES_SEARCH,
            &EMPLOYEES_ALL,
            &SERVICES_FOR_SALE,
            &SERVICES_ALL,
            &UNKNOWN_REPORT,
        ]
    }

    #[test]
    fn declared_params_match_placeholders() {
        for template in all_templates() {
            let stmt = Statement::new(template.sql);
            assert_eq!(stmt.placeholders(), template.params, "{}", template.sql);
        }
    }

    #[test]
    fn parse_round_trips_known_names() {
        for kind in ReportKind::KNOWN.iter() {
            assert_eq!(&ReportKind::parse(kind.name()), kind);
        }
        assert_eq!(
            ReportKind::parse("nope"),
            ReportKind::Unknown("nope".to_string())
        );
    }

    #[test]
    fn sales_monthly_variants() {
        let kind = ReportKind::SalesMonthly;
        let both = FilterSet {
            year: Some(2024),
            month: Some(5),
            ..Default::default()
        };
        let stmt = kind.statement(&both).unwrap();
        assert_eq!(stmt.sql(), SALES_BY_MONTH.sql);
        assert_eq!(stmt.param("year"), Some(&SqlValue::Int(2024)));
        assert_eq!(stmt.param("month"), Some(&SqlValue::Int(5)));

        let year_only = FilterSet {
            year: Some(2024),
            ..Default::default()
        };
        assert_eq!(kind.resolve(&year_only), &SALES_BY_YEAR);

        // month without year falls back to the unfiltered listing and binds nothing
        let month_only = FilterSet {
            month: Some(5),
            ..Default::default()
        };
        let stmt = kind.statement(&month_only).unwrap();
        assert_eq!(stmt.sql(), SALES_ALL.sql);
        assert!(stmt.named_params().is_empty());
    }

    #[test]
    fn top_clients_limit() {
        let kind = ReportKind::TopClients;
        let stmt = kind.statement(&FilterSet::default()).unwrap();
        assert!(stmt
            .sql()
            .ends_with(&format!("LIMIT {}", DEFAULT_TOP_CLIENTS_LIMIT)));
        assert!(stmt.named_params().is_empty());

        let two = FilterSet {
            limit: Some(2),
            ..Default::default()
        };
        let stmt = kind.statement(&two).unwrap();
        assert!(stmt.sql().ends_with("LIMIT :limit"));
        assert_eq!(stmt.param("limit"), Some(&SqlValue::Int(2)));

        for bad in [0, -3] {
            let filters = FilterSet {
                limit: Some(bad),
                ..Default::default()
            };
            assert_eq!(kind.resolve(&filters), &TOP_CLIENTS_DEFAULT);
        }
    }

    #[test]
    fn range_reports_need_both_ends() {
        let from_only = FilterSet {
            from: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert_eq!(ReportKind::SoldCars.resolve(&from_only), &SOLD_CARS_ALL);
        assert_eq!(ReportKind::Profit.resolve(&from_only), &PROFIT_MONTHLY);

        let range = FilterSet {
            from: Some("2024-01-01".into()),
            to: Some("2024-01-31".into()),
            ..Default::default()
        };
        let stmt = ReportKind::Profit.statement(&range).unwrap();
        assert_eq!(stmt.sql(), PROFIT_DAILY.sql);
        let compiled = stmt.compile().unwrap();
        assert!(compiled.sql.contains("BETWEEN $1::date AND $2::date"));
        assert_eq!(
            compiled.binds,
            vec![
                SqlValue::Text("2024-01-01".into()),
                SqlValue::Text("2024-01-31".into())
            ]
        );
    }

    #[test]
    fn sold_cars_range_binds_from_and_to() {
        let range = FilterSet {
            from: Some("2024-03-01T00:00:00".into()),
            to: Some("2024-03-31T23:59:59".into()),
            year: Some(2024),
            ..Default::default()
        };
        let stmt = ReportKind::SoldCars.statement(&range).unwrap();
        assert_eq!(stmt.sql(), SOLD_CARS_IN_RANGE.sql);
        let bound: Vec<&str> = stmt
            .named_params()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(bound, ["from", "to"]);

        let compiled = stmt.compile().unwrap();
        assert!(compiled
            .sql
            .contains("BETWEEN $1::timestamp AND $2::timestamp"));
        assert_eq!(
            compiled.binds,
            vec![
                SqlValue::Text("2024-03-01T00:00:00".into()),
                SqlValue::Text("2024-03-31T23:59:59".into())
            ]
        );

        let to_only = FilterSet {
            to: Some("2024-03-31".into()),
            ..Default::default()
        };
        let stmt = ReportKind::SoldCars.statement(&to_only).unwrap();
        assert_eq!(stmt.sql(), SOLD_CARS_ALL.sql);
        assert!(stmt.named_params().is_empty());
    }

    #[test]
    fn filters_trim_only_to_detect_blanks() {
        let filters: FilterSet = serde_json::from_value(serde_json::json!({
            "q": " smith ",
            "from": "   ",
            "year": " 2024 ",
        }))
        .unwrap();
        assert_eq!(filters.q.as_deref(), Some(" smith "));
        assert_eq!(filters.from, None);
        assert_eq!(filters.year, Some(2024));

        let compiled = ReportKind::Employees
            .statement(&filters)
            .unwrap()
            .compile()
            .unwrap();
        assert_eq!(compiled.binds, vec![SqlValue::Text(" smith ".into())]);

        let bad: Result<FilterSet, _> =
            serde_json::from_value(serde_json::json!({ "limit": "five" }));
        assert!(bad.is_err());
    }

    #[test]
    fn employees_search_binds_q_once() {
        let filters = FilterSet {
            q: Some("smith".into()),
            ..Default::default()
        };
        let compiled = ReportKind::Employees
            .statement(&filters)
            .unwrap()
            .compile()
            .unwrap();
        assert_eq!(compiled.binds, vec![SqlValue::Text("smith".into())]);
        assert_eq!(compiled.sql.matches("$1").count(), 2);
    }

    #[test]
    fn services_sales_by_sale() {
        let filters = FilterSet {
            sale_id: Some(17),
            ..Default::default()
        };
        let stmt = ReportKind::ServicesSales.statement(&filters).unwrap();
        assert_eq!(stmt.param("saleId"), Some(&SqlValue::Int(17)));
        assert_eq!(
            ReportKind::ServicesSales.resolve(&FilterSet::default()),
            &SERVICES_ALL
        );
    }

    #[test]
    fn unknown_report_is_a_diagnostic_query() {
        let stmt = ReportKind::parse("weekly-bonus")
            .statement(&FilterSet {
                year: Some(2024),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(stmt.sql(), "SELECT 'Test' AS test");
        assert!(stmt.named_params().is_empty());
    }

    #[test]
    fn catalog_lists_known_reports_only() {
        let names: Vec<&str> = catalog().iter().map(|info| info.name).collect();
        assert_eq!(
            names,
            [
                "sales-monthly",
                "top-clients",
                "sold-cars",
                "profit",
                "employees",
                "services-sales"
            ]
        );
    }
}
