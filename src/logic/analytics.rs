use serde_json::Value;

use crate::model::{SalesReport, SystemUsage, UserEngagement};

fn flag(data: &Value, field: &str) -> bool {
    data.get(field).map_or(false, |value| match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        _ => true,
    })
}

/// Users with a truthy `active` field count as active, everyone else as inactive
pub fn user_engagement(users: &[Value]) -> UserEngagement {
    let active_users = users.iter().filter(|user| flag(user, "active")).count();
    UserEngagement {
        total_users: users.len(),
        active_users,
        inactive_users: users.len() - active_users,
    }
}

/// Sum of `total_amount` over the given transactions; a missing or
/// non-numeric amount counts as zero
pub fn sales_report(transactions: &[Value]) -> SalesReport {
    let total_sales: f64 = transactions
        .iter()
        .filter_map(|t| t.get("total_amount").and_then(Value::as_f64))
        .sum();
    let avg_order_value = if transactions.is_empty() {
        0.0
    } else {
        total_sales / transactions.len() as f64
    };

    SalesReport {
        total_sales,
        total_transactions: transactions.len(),
        avg_order_value,
        page: None,
        limit: None,
    }
}

pub fn system_usage(sessions: &[Value]) -> SystemUsage {
    SystemUsage {
        total_sessions: sessions.len(),
        active_sessions: sessions.iter().filter(|s| flag(s, "active")).count(),
        total_errors: sessions.iter().filter(|s| flag(s, "error")).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_engagement() {
        let users = vec![
            json!({"active": true}),
            json!({"active": false}),
            json!({"name": "no flag"}),
            json!({"active": "yes"}),
        ];
        assert_eq!(
            user_engagement(&users),
            UserEngagement {
                total_users: 4,
                active_users: 2,
                inactive_users: 2,
            }
        );
    }

    #[test]
    fn test_sales_report_skips_missing_amounts() {
        let report = sales_report(&[
            json!({"total_amount": 300}),
            json!({"total_amount": 100.5}),
            json!({"total_amount": "n/a"}),
            json!({}),
        ]);
        assert_eq!(report.total_transactions, 4);
        assert_eq!(report.total_sales, 400.5);
        assert!((report.avg_order_value - 100.125).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sales_have_zero_average() {
        let report = sales_report(&[]);
        assert_eq!(report.total_sales, 0.0);
        assert_eq!(report.avg_order_value, 0.0);
    }

    #[test]
    fn test_system_usage() {
        let usage = system_usage(&[
            json!({"active": true}),
            json!({"active": true, "error": "timeout"}),
            json!({"active": false, "error": null}),
        ]);
        assert_eq!(
            usage,
            SystemUsage {
                total_sessions: 3,
                active_sessions: 2,
                total_errors: 1,
            }
        );
    }
}
