//! Analytics aggregation and metric caching

#[cfg(test)]
mod tests {
    use crate::{
        cache::CacheStore,
        models::{DateRange, TransactionType},
        service::NO_TRANSACTIONS_DAY,
        tests::common::{new_transaction, setup, Harness},
        validation::validate_date_range,
    };

    async fn seed(h: &Harness, rows: &[(i64, f64, TransactionType, &str)]) {
        for &(user_id, amount, kind, date) in rows {
            h.transactions
                .create(&new_transaction(user_id, amount, kind, date))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let h = setup().await;
        seed(
            &h,
            &[
                (1, 100.50, TransactionType::Credit, "2024-11-10T09:15:00Z"),
                (1, 200.75, TransactionType::Debit, "2024-11-10T17:40:00Z"),
                (1, 150.25, TransactionType::Credit, "2024-11-11T08:00:00Z"),
            ],
        )
        .await;

        let analytics = h.analytics.analytics(1, &DateRange::default()).await.unwrap();

        assert_eq!(analytics.average_transaction_value, 150.50);
        assert_eq!(analytics.day_of_highest_number_of_transactions, "2024-11-10");
        assert_eq!(analytics.highest_number_of_transactions_in_a_day, 2);
        assert_eq!(analytics.total_credit_value, 250.75);
        assert_eq!(analytics.total_debit_value, 200.75);
    }

    #[tokio::test]
    async fn test_zero_record_analytics_are_cached() {
        let h = setup().await;

        let analytics = h.analytics.analytics(42, &DateRange::default()).await.unwrap();
        assert_eq!(analytics.average_transaction_value, 0.0);
        assert_eq!(analytics.highest_number_of_transactions_in_a_day, 0);
        assert_eq!(analytics.day_of_highest_number_of_transactions, NO_TRANSACTIONS_DAY);
        assert_eq!(analytics.total_credit_value, 0.0);
        assert_eq!(analytics.total_debit_value, 0.0);

        let calls = h.records.calls();
        let again = h.analytics.analytics(42, &DateRange::default()).await.unwrap();
        assert_eq!(again, analytics);
        assert_eq!(h.records.calls(), calls, "Sparse users must not be recomputed");
        assert_eq!(h.store.keys_matching("analytics:42:*").len(), 5);
    }

    #[tokio::test]
    async fn test_busiest_day_tie_prefers_latest_date() {
        let h = setup().await;
        seed(
            &h,
            &[
                (1, 1.0, TransactionType::Credit, "2024-03-01T08:00:00Z"),
                (1, 1.0, TransactionType::Credit, "2024-03-01T20:00:00Z"),
                (1, 1.0, TransactionType::Debit, "2024-03-05T08:00:00Z"),
                (1, 1.0, TransactionType::Debit, "2024-03-05T09:00:00Z"),
                (1, 1.0, TransactionType::Debit, "2024-03-03T09:00:00Z"),
            ],
        )
        .await;

        let busiest = h.analytics.busiest_day(1).await.unwrap();
        assert_eq!(busiest.day, "2024-03-05");
        assert_eq!(busiest.count, 2);
    }

    #[tokio::test]
    async fn test_busiest_day_ignores_time_of_day() {
        let h = setup().await;
        seed(
            &h,
            &[
                (1, 5.0, TransactionType::Credit, "2024-03-01T00:00:01Z"),
                (1, 5.0, TransactionType::Credit, "2024-03-01T12:00:00Z"),
                (1, 5.0, TransactionType::Credit, "2024-03-01T23:59:59Z"),
                (1, 5.0, TransactionType::Credit, "2024-03-02T10:00:00Z"),
            ],
        )
        .await;

        let busiest = h.analytics.busiest_day(1).await.unwrap();
        assert_eq!(busiest.day, "2024-03-01");
        assert_eq!(busiest.count, 3);
    }

    #[tokio::test]
    async fn test_totals_respect_inclusive_date_range() {
        let h = setup().await;
        seed(
            &h,
            &[
                (1, 10.0, TransactionType::Credit, "2024-01-31T23:59:59Z"),
                (1, 20.0, TransactionType::Credit, "2024-02-01T00:00:00Z"),
                (1, 30.0, TransactionType::Debit, "2024-02-15T12:00:00Z"),
                (1, 40.0, TransactionType::Credit, "2024-02-29T18:30:00Z"),
                (1, 50.0, TransactionType::Debit, "2024-03-01T00:00:00Z"),
            ],
        )
        .await;

        let february = validate_date_range(Some("2024-02-01"), Some("2024-02-29")).unwrap();
        let totals = h.analytics.value_totals(1, &february).await.unwrap();
        assert_eq!(totals.credit, 60.0);
        assert_eq!(totals.debit, 30.0);

        let from_mid_february = validate_date_range(Some("2024-02-15T12:00:00Z"), None).unwrap();
        let totals = h.analytics.value_totals(1, &from_mid_february).await.unwrap();
        assert_eq!(totals.credit, 40.0);
        assert_eq!(totals.debit, 80.0);

        let until_january = validate_date_range(None, Some("2024-01-31")).unwrap();
        let totals = h.analytics.value_totals(1, &until_january).await.unwrap();
        assert_eq!(totals.credit, 10.0);
        assert_eq!(totals.debit, 0.0);

        let everything = h.analytics.value_totals(1, &DateRange::default()).await.unwrap();
        assert_eq!(everything.credit, 70.0);
        assert_eq!(everything.debit, 80.0);
    }

    #[tokio::test]
    async fn test_each_metric_is_cached_independently() {
        let h = setup().await;
        seed(&h, &[(1, 12.346, TransactionType::Credit, "2024-05-05")]).await;

        let calls = h.records.calls();
        let average = h.analytics.average_transaction_value(1).await.unwrap();
        assert_eq!(average, 12.35);
        assert_eq!(h.records.calls(), calls + 1);

        // Average is cached, the other metrics still have to be computed
        h.analytics.analytics(1, &DateRange::default()).await.unwrap();
        assert_eq!(h.records.calls(), calls + 3);

        // A new date window is a separate entry
        let window = validate_date_range(Some("2024-05-01"), None).unwrap();
        h.analytics.analytics(1, &window).await.unwrap();
        assert_eq!(h.records.calls(), calls + 4);

        h.analytics.analytics(1, &window).await.unwrap();
        assert_eq!(h.records.calls(), calls + 4);

        // Losing one half of a pair recomputes that metric only
        h.store
            .delete("analytics:1:highest_number_of_transaction_in_a_day")
            .await
            .unwrap();
        let busiest = h.analytics.busiest_day(1).await.unwrap();
        assert_eq!(busiest.count, 1);
        assert_eq!(h.records.calls(), calls + 5);
    }

    #[tokio::test]
    async fn test_analytics_are_scoped_per_user() {
        let h = setup().await;
        seed(
            &h,
            &[
                (1, 100.0, TransactionType::Credit, "2024-05-05"),
                (2, 7.0, TransactionType::Debit, "2024-05-06"),
            ],
        )
        .await;

        let first = h.analytics.analytics(1, &DateRange::default()).await.unwrap();
        let second = h.analytics.analytics(2, &DateRange::default()).await.unwrap();

        assert_eq!(first.total_credit_value, 100.0);
        assert_eq!(first.total_debit_value, 0.0);
        assert_eq!(second.total_debit_value, 7.0);
        assert_eq!(second.day_of_highest_number_of_transactions, "2024-05-06");
    }
}
