// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use crate::config::{load_and_validate, load_repository};
    use crate::definitions::{SourceKind, ViewKind};
    use crate::transforms::TransformCatalog;
    use std::path::PathBuf;

    fn shipped_repository() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs/fraud_detection.yaml")
    }

    /// The shipped repository parses into the expected descriptors
    #[test]
    fn test_fraud_detection_yaml_loading() {
        let repository = load_repository(shipped_repository()).unwrap();

        assert_eq!(repository.workspace, "fraud_detection");
        assert_eq!(repository.entities.len(), 1);
        assert_eq!(repository.entities[0].join_keys, vec!["user_id"]);

        let sources: Vec<(&str, SourceKind)> = repository
            .sources
            .iter()
            .map(|s| (s.name(), s.kind()))
            .collect();
        assert_eq!(
            sources,
            vec![
                ("users", SourceKind::Batch),
                ("transactions_batch", SourceKind::Batch),
                ("transactions_stream", SourceKind::Stream),
            ]
        );

        let views: Vec<(&str, ViewKind)> = repository
            .feature_views
            .iter()
            .map(|v| (v.name(), v.kind()))
            .collect();
        assert_eq!(
            views,
            vec![
                ("user_credit_card_issuer", ViewKind::Batch),
                ("user_transaction_metrics", ViewKind::Batch),
                ("user_transaction_amount_totals", ViewKind::Stream),
                ("transaction_amount_is_higher_than_average", ViewKind::OnDemand),
            ]
        );

        let services: Vec<&str> = repository
            .feature_services
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(
            services,
            vec![
                "fraud_detection_feature_service",
                "fraud_detection_feature_service:v2",
                "fraud_detection_feature_service_streaming",
            ]
        );
    }

    /// Metrics view carries its tags and tiles on its explicit interval
    #[test]
    fn test_user_transaction_metrics_features() {
        let repository = load_repository(shipped_repository()).unwrap();
        let metrics = &repository.feature_views[1];

        assert_eq!(metrics.tags().get("team").map(String::as_str), Some("finance"));
        assert_eq!(metrics.tags().get("status").map(String::as_str), Some("production"));

        let features: Vec<String> = metrics
            .features(&["user_id".to_string()])
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(
            features,
            vec![
                "amount_mean_1d_1d",
                "amount_mean_3d_1d",
                "amount_mean_7d_1d",
                "amount_count_1d_1d",
                "amount_count_3d_1d",
                "amount_count_7d_1d",
            ]
        );
    }

    /// Stream aggregates without an interval are continuous
    #[test]
    fn test_user_transaction_amount_totals_features() {
        let repository = load_repository(shipped_repository()).unwrap();
        let totals = &repository.feature_views[2];

        let features: Vec<String> = totals
            .features(&["user_id".to_string()])
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(
            features,
            vec![
                "amount_sum_1m_continuous",
                "amount_sum_1h_continuous",
                "amount_sum_30d_continuous",
            ]
        );
    }

    /// The shipped repository validates against the builtin catalog
    #[test]
    fn test_fraud_detection_validates() {
        let result = load_and_validate(&[shipped_repository()], &TransformCatalog::builtin());
        assert!(result.is_ok(), "{}", result.err().map(|e| e.to_string()).unwrap_or_default());
    }

    /// Without its transforms the repository is rejected, one error per view
    #[test]
    fn test_fraud_detection_needs_catalog() {
        let err = load_and_validate(&[shipped_repository()], &TransformCatalog::new()).unwrap_err();
        let message = err.to_string();

        for view in [
            "user_credit_card_issuer",
            "user_transaction_metrics",
            "user_transaction_amount_totals",
            "transaction_amount_is_higher_than_average",
        ] {
            assert!(
                message.contains(&format!(
                    "Feature view '{}' uses transform '{}' which is not in the catalog",
                    view, view
                )),
                "missing error for '{}' in:\n{}",
                view,
                message
            );
        }
    }
}
