#[cfg(test)]
mod tests {
    use crate::service::mock::MockCalendarService;
    use crate::verifier::{EventFixture, UpdateFields};
    use calprobe_config::FixtureConfig;
    use proptest::prelude::*;
    use std::sync::Arc;

    // Helper function to drive the async service from a sync proptest body
    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime")
            .block_on(future)
    }

    fn text() -> impl Strategy<Value = Option<String>> {
        prop::option::of("[a-zA-Z0-9가-힣 ]{1,16}")
    }

    proptest! {
        // Whatever is given comes back verbatim; whatever is absent is gone
        #[test]
        fn test_update_result_contains_exactly_given_fields(
            summary in text(),
            description in text(),
            location in text(),
            zone in prop::sample::select(vec!["UTC", "Asia/Seoul", "Europe/Zurich", "America/New_York"]),
        ) {
            let (updated, default_zone) = block_on(async {
                let service = Arc::new(MockCalendarService::new());
                let fixture = EventFixture::setup(service, "primary", &FixtureConfig::default())
                    .await
                    .expect("setup");
                let fields = UpdateFields {
                    summary: summary.clone(),
                    description: description.clone(),
                    location: location.clone(),
                    time_zone: Some(zone.to_string()),
                };
                let updated = fixture.update_event(fields).await.expect("update");
                let default_zone = fixture.default_time_zone().to_string();
                fixture.teardown().await;
                (updated, default_zone)
            });

            prop_assert_eq!(updated.has_field("summary"), summary.is_some());
            prop_assert_eq!(updated.has_field("description"), description.is_some());
            prop_assert_eq!(updated.has_field("location"), location.is_some());
            prop_assert_eq!(updated.text_field("start.timeZone"), Some(zone.to_string()));
            prop_assert_eq!(updated.text_field("end.timeZone"), Some(zone.to_string()));
            prop_assert_eq!(updated.summary, summary);
            prop_assert_eq!(updated.description, description);
            prop_assert_eq!(updated.location, location);
            prop_assert_eq!(default_zone, "UTC");
        }

        // The same update twice yields the same fields
        #[test]
        fn test_repeated_update_is_idempotent(
            summary in text(),
            location in text(),
        ) {
            let (first, second) = block_on(async {
                let service = Arc::new(MockCalendarService::new());
                let fixture = EventFixture::setup(service, "primary", &FixtureConfig::default())
                    .await
                    .expect("setup");
                let fields = UpdateFields {
                    summary: summary.clone(),
                    location: location.clone(),
                    ..Default::default()
                };
                let first = fixture.update_event(fields.clone()).await.expect("first update");
                let second = fixture.update_event(fields).await.expect("second update");
                fixture.teardown().await;
                (first, second)
            });

            prop_assert_eq!(first, second);
        }
    }
}
