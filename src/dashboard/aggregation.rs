//! Transaction data aggregation for the dashboard.
//!
//! Provides the pure function that turns a filtered transaction set into
//! per-type totals, derived financial ratios, and a per-day time series.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::models::{Transaction, TransactionType, iso_date};

const ADS_COLOR: &str = "#3b82f6";
const EXPENSE_COLOR: &str = "#ef4444";

/// Aggregate metrics derived from a filtered set of transactions.
///
/// Every ratio is zero when its denominator is zero, never NaN or an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Total advertising spend.
    #[serde(with = "rust_decimal::serde::float")]
    pub ads: Decimal,
    /// Total expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
    /// Total revenue.
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    /// Advertising spend plus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    /// Revenue minus total cost.
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
    /// Return on investment: profit as a percentage of total cost.
    #[serde(with = "rust_decimal::serde::float")]
    pub roi: Decimal,
    /// Return on ad spend: revenue per unit of advertising spend.
    #[serde(with = "rust_decimal::serde::float")]
    pub roas: Decimal,
    /// Profit as a percentage of revenue.
    #[serde(with = "rust_decimal::serde::float")]
    pub margin: Decimal,
    /// Number of daily buckets that closed with a positive result.
    pub good_days: usize,
    /// Number of daily buckets that did not.
    pub bad_days: usize,
    /// Profit averaged over the daily buckets.
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_profit: Decimal,
    /// Per-day totals, sorted by date ascending.
    pub daily_data: Vec<DailyBucket>,
    /// Nonzero cost types with their fixed display colors, for the
    /// proportion chart.
    pub type_data: Vec<TypeSlice>,
}

/// The totals for all transactions sharing one exact date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    /// The date shared by every transaction in the bucket.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Revenue minus costs for the day.
    #[serde(with = "rust_decimal::serde::float")]
    pub result: Decimal,
    /// Revenue for the day.
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    /// Advertising spend plus expenses for the day.
    #[serde(with = "rust_decimal::serde::float")]
    pub costs: Decimal,
}

/// One cost type's share of spend, tagged with its fixed display color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSlice {
    /// Display label.
    pub name: &'static str,
    /// Sum of amounts for the type.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Display color.
    pub color: &'static str,
}

/// Compute [Metrics] over a filtered set of transactions.
///
/// Pure function of its input: no store access, no caching, no persisted
/// state.
pub fn aggregate(transactions: &[Transaction]) -> Metrics {
    let ads = sum_by_type(transactions, TransactionType::Ads);
    let expenses = sum_by_type(transactions, TransactionType::Expense);
    let revenue = sum_by_type(transactions, TransactionType::Revenue);

    let total_cost = ads + expenses;
    let profit = revenue - total_cost;

    let roi = if total_cost > Decimal::ZERO {
        profit / total_cost * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let roas = if ads > Decimal::ZERO {
        revenue / ads
    } else {
        Decimal::ZERO
    };
    let margin = if revenue > Decimal::ZERO {
        profit / revenue * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let daily_data = daily_series(transactions);

    let good_days = daily_data
        .iter()
        .filter(|bucket| bucket.result > Decimal::ZERO)
        .count();
    let bad_days = daily_data.len() - good_days;
    let avg_profit = if daily_data.is_empty() {
        Decimal::ZERO
    } else {
        profit / Decimal::from(daily_data.len())
    };

    let type_data = [
        TypeSlice {
            name: "Ads",
            value: ads,
            color: ADS_COLOR,
        },
        TypeSlice {
            name: "Expenses",
            value: expenses,
            color: EXPENSE_COLOR,
        },
    ]
    .into_iter()
    .filter(|slice| slice.value > Decimal::ZERO)
    .collect();

    Metrics {
        ads,
        expenses,
        revenue,
        total_cost,
        profit,
        roi,
        roas,
        margin,
        good_days,
        bad_days,
        avg_profit,
        daily_data,
        type_data,
    }
}

/// Sums the amounts of all transactions with the type `transaction_type`.
fn sum_by_type(transactions: &[Transaction], transaction_type: TransactionType) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| transaction.transaction_type() == transaction_type)
        .map(Transaction::amount)
        .sum()
}

#[derive(Debug, Default, Clone, Copy)]
struct DayTotals {
    ads: Decimal,
    expenses: Decimal,
    revenue: Decimal,
}

/// Groups transactions by exact date (string-equal, not a range) and computes
/// per-day totals, sorted by date ascending.
fn daily_series(transactions: &[Transaction]) -> Vec<DailyBucket> {
    let mut totals_by_date: HashMap<Date, DayTotals> = HashMap::new();

    for transaction in transactions {
        let totals = totals_by_date.entry(transaction.date()).or_default();

        match transaction.transaction_type() {
            TransactionType::Ads => totals.ads += transaction.amount(),
            TransactionType::Expense => totals.expenses += transaction.amount(),
            TransactionType::Revenue => totals.revenue += transaction.amount(),
        }
    }

    let mut dates: Vec<Date> = totals_by_date.keys().copied().collect();
    dates.sort();

    dates
        .into_iter()
        .map(|date| {
            let totals = totals_by_date[&date];
            let costs = totals.ads + totals.expenses;

            DailyBucket {
                date,
                result: totals.revenue - costs,
                revenue: totals.revenue,
                costs,
            }
        })
        .collect()
}

#[cfg(test)]
mod aggregation_tests {
    use rust_decimal::Decimal;
    use time::macros::{date, datetime};

    use crate::models::{Transaction, TransactionType};

    use super::{DailyBucket, aggregate};

    fn create_test_transaction(
        amount: &str,
        date: time::Date,
        transaction_type: TransactionType,
    ) -> Transaction {
        Transaction::new_unchecked(
            format!("{date}-{amount}-{}", transaction_type.as_str()),
            date,
            transaction_type,
            amount.parse().unwrap(),
            None,
            None,
            datetime!(2024-01-05 12:00 UTC),
        )
    }

    fn end_to_end_transactions() -> Vec<Transaction> {
        vec![
            create_test_transaction("500", date!(2024 - 01 - 01), TransactionType::Revenue),
            create_test_transaction("100", date!(2024 - 01 - 01), TransactionType::Ads),
            create_test_transaction("50", date!(2024 - 01 - 02), TransactionType::Expense),
        ]
    }

    #[test]
    fn computes_sums_and_ratios() {
        let metrics = aggregate(&end_to_end_transactions());

        assert_eq!(metrics.ads, Decimal::from(100));
        assert_eq!(metrics.expenses, Decimal::from(50));
        assert_eq!(metrics.revenue, Decimal::from(500));
        assert_eq!(metrics.total_cost, Decimal::from(150));
        assert_eq!(metrics.profit, Decimal::from(350));
        assert_eq!(
            metrics.roi,
            Decimal::from(350) / Decimal::from(150) * Decimal::ONE_HUNDRED
        );
        assert_eq!(metrics.roas, Decimal::from(5));
        assert_eq!(metrics.margin, Decimal::from(70));
    }

    #[test]
    fn computes_daily_series() {
        let metrics = aggregate(&end_to_end_transactions());

        assert_eq!(
            metrics.daily_data,
            vec![
                DailyBucket {
                    date: date!(2024 - 01 - 01),
                    result: Decimal::from(400),
                    revenue: Decimal::from(500),
                    costs: Decimal::from(100),
                },
                DailyBucket {
                    date: date!(2024 - 01 - 02),
                    result: Decimal::from(-50),
                    revenue: Decimal::ZERO,
                    costs: Decimal::from(50),
                },
            ]
        );
        assert_eq!(metrics.good_days, 1);
        assert_eq!(metrics.bad_days, 1);
        assert_eq!(metrics.avg_profit, Decimal::from(175));
    }

    #[test]
    fn sums_by_type_partition_the_total() {
        let transactions = vec![
            create_test_transaction("1.1", date!(2024 - 01 - 01), TransactionType::Ads),
            create_test_transaction("2.2", date!(2024 - 01 - 02), TransactionType::Expense),
            create_test_transaction("3.3", date!(2024 - 01 - 03), TransactionType::Revenue),
            create_test_transaction("4.4", date!(2024 - 01 - 01), TransactionType::Revenue),
        ];

        let metrics = aggregate(&transactions);

        let total: Decimal = transactions
            .iter()
            .map(|transaction| transaction.amount())
            .sum();
        assert_eq!(metrics.ads + metrics.expenses + metrics.revenue, total);
    }

    #[test]
    fn daily_buckets_partition_the_transactions() {
        let transactions = vec![
            create_test_transaction("1", date!(2024 - 01 - 01), TransactionType::Ads),
            create_test_transaction("2", date!(2024 - 01 - 01), TransactionType::Revenue),
            create_test_transaction("3", date!(2024 - 01 - 02), TransactionType::Expense),
        ];

        let metrics = aggregate(&transactions);

        // Every record lands in exactly one bucket, so the per-bucket totals
        // reconcile with the overall sums.
        let bucket_costs: Decimal = metrics
            .daily_data
            .iter()
            .map(|bucket| bucket.costs)
            .sum();
        let bucket_revenue: Decimal = metrics
            .daily_data
            .iter()
            .map(|bucket| bucket.revenue)
            .sum();
        assert_eq!(bucket_costs, metrics.total_cost);
        assert_eq!(bucket_revenue, metrics.revenue);

        for bucket in &metrics.daily_data {
            assert_eq!(bucket.result, bucket.revenue - bucket.costs);
        }
    }

    #[test]
    fn daily_series_is_sorted_ascending() {
        let transactions = vec![
            create_test_transaction("1", date!(2024 - 03 - 15), TransactionType::Ads),
            create_test_transaction("2", date!(2024 - 01 - 20), TransactionType::Ads),
            create_test_transaction("3", date!(2024 - 02 - 10), TransactionType::Ads),
        ];

        let metrics = aggregate(&transactions);

        let dates: Vec<time::Date> = metrics
            .daily_data
            .iter()
            .map(|bucket| bucket.date)
            .collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 01 - 20),
                date!(2024 - 02 - 10),
                date!(2024 - 03 - 15)
            ]
        );
    }

    #[test]
    fn ratios_are_zero_when_denominators_are_zero() {
        let metrics = aggregate(&[create_test_transaction(
            "500",
            date!(2024 - 01 - 01),
            TransactionType::Revenue,
        )]);

        assert_eq!(metrics.roi, Decimal::ZERO);
        assert_eq!(metrics.roas, Decimal::ZERO);
        assert_eq!(metrics.margin, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn empty_input_yields_all_zeros() {
        let metrics = aggregate(&[]);

        assert_eq!(metrics.profit, Decimal::ZERO);
        assert_eq!(metrics.roi, Decimal::ZERO);
        assert_eq!(metrics.roas, Decimal::ZERO);
        assert_eq!(metrics.margin, Decimal::ZERO);
        assert_eq!(metrics.avg_profit, Decimal::ZERO);
        assert_eq!(metrics.good_days, 0);
        assert_eq!(metrics.bad_days, 0);
        assert!(metrics.daily_data.is_empty());
        assert!(metrics.type_data.is_empty());
    }

    #[test]
    fn type_distribution_keeps_only_nonzero_cost_types() {
        let metrics = aggregate(&[
            create_test_transaction("100", date!(2024 - 01 - 01), TransactionType::Ads),
            create_test_transaction("500", date!(2024 - 01 - 01), TransactionType::Revenue),
        ]);

        assert_eq!(metrics.type_data.len(), 1);
        assert_eq!(metrics.type_data[0].name, "Ads");
        assert_eq!(metrics.type_data[0].value, Decimal::from(100));
        assert_eq!(metrics.type_data[0].color, "#3b82f6");
    }
}
