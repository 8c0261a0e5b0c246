mod common;

use common::{fixture_path, TestWorkspace, ORDERS_FIXTURE, REVIEWS_FIXTURE};
use delivery_insight::config::SessionConfig;
use delivery_insight::charts::{
    StaticChartRenderer, HISTOGRAM_FILE, SCORE_CHART_FILE, STATUS_CHART_FILE,
};
use delivery_insight::data::{DataLoader, DeliveryStatus, LoaderError, NO_MESSAGE, NO_TITLE};
use delivery_insight::session::Session;

fn fixture_config() -> SessionConfig {
    SessionConfig::default().with_paths(
        Some(fixture_path(ORDERS_FIXTURE)),
        Some(fixture_path(REVIEWS_FIXTURE)),
    )
}

fn fixture_session() -> Session {
    Session::load(fixture_config()).expect("fixture session")
}

#[test]
fn keeps_only_complete_delivered_orders() {
    let session = fixture_session();
    assert_eq!(session.raw_order_count, 8);
    assert_eq!(session.raw_review_count, 8);
    assert_eq!(session.review_count, 7);

    let ids: Vec<&str> = session.orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["o1", "o2", "o3", "o4", "o7", "o8"]);
}

#[test]
fn unparsable_delivery_date_leaves_order_unclassified() {
    let session = fixture_session();
    let o7 = session
        .orders
        .iter()
        .find(|o| o.order_id == "o7")
        .expect("o7 kept");
    assert!(o7.delivered_customer_date.is_none());
    assert!(o7.status.is_none());
    assert!(o7.delivery_time_days.is_none());
}

#[test]
fn status_counts_are_sorted_by_frequency() {
    let session = fixture_session();
    let counts: Vec<(DeliveryStatus, usize)> = session
        .status_counts
        .iter()
        .map(|c| (c.status, c.orders))
        .collect();
    assert_eq!(
        counts,
        vec![
            (DeliveryStatus::Early, 2),
            (DeliveryStatus::Late, 2),
            (DeliveryStatus::OnTime, 1),
        ]
    );
}

#[test]
fn delivery_days_are_truncated_whole_days() {
    let session = fixture_session();
    let days: Vec<(&str, Option<i64>)> = session
        .orders
        .iter()
        .map(|o| (o.order_id.as_str(), o.delivery_time_days))
        .collect();
    assert_eq!(
        days,
        vec![
            ("o1", Some(5)),
            ("o2", Some(9)),
            ("o3", Some(23)),
            ("o4", Some(1)),
            ("o7", None),
            ("o8", Some(120)),
        ]
    );

    let stats = &session.delivery_stats;
    assert_eq!(stats.count, 5);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 120.0);
    assert_eq!(stats.median, 9.0);
    assert!((stats.mean - 31.6).abs() < 1e-9);
    assert_eq!(
        session.histogram.iter().map(|b| b.count).sum::<usize>(),
        stats.count
    );
}

#[test]
fn left_join_keeps_unreviewed_orders_and_fills_placeholders() {
    let session = fixture_session();
    assert_eq!(session.joined.len(), 7);

    let o3_rows = session
        .joined
        .iter()
        .filter(|row| row.order.order_id == "o3")
        .count();
    assert_eq!(o3_rows, 2);

    let o4 = session
        .joined
        .iter()
        .find(|row| row.order.order_id == "o4")
        .expect("o4 joined");
    assert!(o4.review.is_none());

    let o1_review = session
        .joined
        .iter()
        .find(|row| row.order.order_id == "o1")
        .and_then(|row| row.review.as_ref())
        .expect("o1 reviewed");
    assert_eq!(o1_review.comment_title, NO_TITLE);
    assert_eq!(o1_review.comment_message, "Great");

    let o2_review = session
        .joined
        .iter()
        .find(|row| row.order.order_id == "o2")
        .and_then(|row| row.review.as_ref())
        .expect("o2 reviewed");
    assert_eq!(o2_review.comment_message, NO_MESSAGE);

    assert!(session
        .joined
        .iter()
        .all(|row| row.review.as_ref().map_or(true, |r| r.order_id != "o99")));
}

#[test]
fn categories_report_observed_buckets_in_order() {
    let session = fixture_session();
    let summary: Vec<(&str, usize)> = session
        .categories
        .iter()
        .map(|c| (c.bucket.label.as_str(), c.count))
        .collect();
    assert_eq!(summary, vec![("0-5", 2), ("6-10", 1), ("21-30", 2)]);

    assert_eq!(session.categories[0].mean_review_score, 5.0);
    assert_eq!(session.categories[1].mean_review_score, 4.0);
    assert_eq!(session.categories[2].mean_review_score, 1.5);

    let o8 = session
        .joined
        .iter()
        .find(|row| row.order.order_id == "o8")
        .expect("o8 joined");
    assert!(o8.delivery_time_category.is_none());
}

#[test]
fn slower_deliveries_get_lower_scores() {
    let session = fixture_session();
    let scores: Vec<(f64, f64, usize)> = session
        .scores
        .iter()
        .map(|s| (s.review_score, s.mean_delivery_days, s.count))
        .collect();
    assert_eq!(
        scores,
        vec![(1.0, 71.5, 2), (2.0, 23.0, 1), (4.0, 9.0, 1), (5.0, 5.0, 1)]
    );

    let r = session.correlation();
    assert!(r < 0.0 && r >= -1.0);
    assert!((session.correlation_matrix[0][0] - 1.0).abs() < 1e-9);
    assert!((session.correlation_matrix[1][1] - 1.0).abs() < 1e-9);
    assert_eq!(session.correlation_matrix[0][1], session.correlation_matrix[1][0]);
}

#[test]
fn exported_data_has_one_line_per_joined_row() {
    let workspace = TestWorkspace::new();
    let session = fixture_session();
    let out = workspace.path().join("all_data.csv");
    session.export_data(&out).expect("export joined data");

    let text = std::fs::read_to_string(&out).expect("read export");
    let mut lines = text.lines();
    let header = lines.next().expect("header line");
    assert!(header.starts_with("order_id,order_purchase_timestamp"));
    assert!(header.ends_with("delivery_time_category"));
    assert_eq!(lines.count(), session.joined.len());
}

#[test]
fn loader_rejects_missing_columns() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("orders.csv", "order_id,order_status\no1,delivered\n");

    let mut loader = DataLoader::new();
    let err = loader.load_orders(&path).unwrap_err();
    assert!(err.to_string().contains("Missing column"));
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let mut config = fixture_config();
    config.orders_path = fixture_path("does_not_exist.csv");

    let err = Session::load(config).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("File not found"));
    assert!(message.contains("does_not_exist.csv"));
}

#[test]
fn review_without_id_still_joins_by_order() {
    let workspace = TestWorkspace::new();
    let reviews = workspace.write(
        "reviews.csv",
        "review_id,order_id,review_score,review_comment_title,review_comment_message\n\
         ,o4,3,,\n\
         r9,,1,,\n",
    );
    let config = SessionConfig::default()
        .with_paths(Some(fixture_path(ORDERS_FIXTURE)), Some(reviews));

    let session = Session::load(config).expect("session");
    assert_eq!(session.raw_review_count, 2);
    assert_eq!(session.review_count, 1);

    let o4 = session
        .joined
        .iter()
        .find(|row| row.order.order_id == "o4")
        .expect("o4 joined");
    assert_eq!(o4.review_score(), Some(3.0));
    assert_eq!(o4.review.as_ref().map(|r| r.review_id.as_str()), Some(""));
}

#[test]
fn malformed_csv_is_a_csv_error() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "orders.csv",
        "order_id,order_status,order_purchase_timestamp,order_approved_at,\
         order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date\n\
         o1,delivered,a,b,c,d,e,f,g,h,i\n\
         o2,\"delivered,2018-01-01 10:00:00,2018-01-01\n",
    );

    let mut loader = DataLoader::new();
    let err = loader.load_orders(&path).unwrap_err();
    assert!(matches!(err, LoaderError::Csv(_)), "unexpected error: {err}");
    assert!(err.to_string().starts_with("Failed to load CSV"));
}

#[test]
fn header_only_files_give_empty_aggregates() {
    let workspace = TestWorkspace::new();
    let orders = workspace.write(
        "orders.csv",
        "order_id,order_status,order_purchase_timestamp,order_approved_at,\
         order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date\n",
    );
    let reviews = workspace.write(
        "reviews.csv",
        "review_id,order_id,review_score,review_comment_title,review_comment_message\n",
    );

    let session = Session::load(SessionConfig::default().with_paths(Some(orders), Some(reviews)))
        .expect("header-only session");
    assert_eq!(session.raw_order_count, 0);
    assert!(session.orders.is_empty());
    assert!(session.joined.is_empty());
    assert!(session.status_counts.is_empty());
    assert!(session.categories.is_empty());
    assert!(session.scores.is_empty());
    assert!(session.histogram.is_empty());
    assert!(session.correlation().is_nan());
}

#[test]
fn chart_export_writes_three_pngs() {
    let workspace = TestWorkspace::new();
    let session = fixture_session();
    let dir = workspace.path().join("charts");

    let written = StaticChartRenderer::export_all(&session, &dir).expect("render charts");
    assert_eq!(written.len(), 3);
    for name in [STATUS_CHART_FILE, HISTOGRAM_FILE, SCORE_CHART_FILE] {
        let path = dir.join(name);
        assert!(written.contains(&path));
        let image = image::open(&path).expect("readable png");
        assert_eq!(image.width(), session.config.chart_width);
        assert_eq!(image.height(), session.config.chart_height);
    }
}
