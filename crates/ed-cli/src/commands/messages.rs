use std::fmt::Write as _;

use ed_api_types::{OriginsResponse, TopChannelsResponse, ORIGIN_PATH, TOP_CHANNELS_PATH};
use ed_core::period::{DateRange, PeriodSelection};
use ed_core::shaper::{self, type_glyph, SectionView};

use super::{api_client, get_json, Endpoint};

/// Run the `messages` subcommand: fetch both reports and print the section.
pub async fn run(endpoint: &Endpoint, period: PeriodSelection, json: bool) -> anyhow::Result<()> {
    let range = period.resolve();
    let view = fetch_section(endpoint, &range).await?;

    if json {
        let out = serde_json::json!({
            "period": period,
            "start": range.params().start_iso(),
            "end": range.params().end_iso(),
            "section": view,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render_report(period, &range, &view));
    }
    Ok(())
}

/// Fetch the origin breakdown and top channels concurrently and shape them.
pub async fn fetch_section(endpoint: &Endpoint, range: &DateRange) -> anyhow::Result<SectionView> {
    let client = api_client(endpoint);
    let params = range.params();

    let (origins, channels) = tokio::join!(
        get_json::<OriginsResponse>(&client, endpoint, ORIGIN_PATH, &params),
        get_json::<TopChannelsResponse>(&client, endpoint, TOP_CHANNELS_PATH, &params),
    );
    let (origins, channels) = (origins?, channels?);

    tracing::debug!(
        origins = origins.origins.len(),
        channels = channels.channels.len(),
        %range,
        "fetched messages section"
    );
    Ok(shaper::shape(Some(&origins), Some(&channels)))
}

/// Plain-text rendering of the section.
pub fn render_report(period: PeriodSelection, range: &DateRange, view: &SectionView) -> String {
    let mut out = String::new();
    let params = range.params();

    let _ = writeln!(out, "Where are messages being sent?  ({})", period.label());
    let _ = writeln!(out, "{} .. {}", params.start_iso(), params.end_iso());
    let _ = writeln!(out, "{}", "-".repeat(48));

    let Some(origins) = view.origins() else {
        let _ = writeln!(out, "Loading...");
        return out;
    };

    let total = origins.total();
    for slice in origins.slices() {
        let _ = writeln!(
            out,
            "{:<18}{:>10}  {:>5.1}%",
            slice.label,
            slice.value,
            slice.percent_of(total)
        );
    }
    let _ = writeln!(out, "{:<18}{:>10}", "Total", total);
    let _ = writeln!(out);

    let _ = writeln!(out, "Most popular channels (Top 5)");
    match view.channels() {
        Some(channels) if !channels.is_empty() => {
            let _ = writeln!(out, "{:>3}  {:<30}{:>10}", "#", "Channel", "Messages");
            for entry in channels {
                let _ = writeln!(
                    out,
                    "{:>3}  {:<30}{:>10}",
                    entry.rank,
                    format!("{} {}", type_glyph(entry.room_type), entry.display_name),
                    entry.message_count
                );
            }
        }
        _ => {
            let _ = writeln!(out, "Not enough data");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn reporting_server(channels: serde_json::Value) -> Router {
        Router::new()
            .route(
                ORIGIN_PATH,
                get(|| async {
                    Json(json!({
                        "origins": [
                            {"t": "d", "messages": 10},
                            {"t": "c", "messages": 5},
                            {"t": "p", "messages": 25}
                        ]
                    }))
                }),
            )
            .route(
                TOP_CHANNELS_PATH,
                get(move || async move { Json(json!({ "channels": channels })) }),
            )
    }

    #[tokio::test]
    async fn messages_renders_breakdown_and_table() {
        let base = serve(reporting_server(json!([
            {"t": "p", "messages": 25, "name": "general"},
            {"t": "d", "messages": 10, "usernames": ["alice", "bob"]}
        ])))
        .await;

        let range = PeriodSelection::Last7.resolve();
        let view = fetch_section(&Endpoint::new(&base), &range).await.unwrap();
        let report = render_report(PeriodSelection::Last7, &range, &view);

        assert!(report.contains("(Last 7 days)"));
        assert!(report.contains("Private chats"));
        assert!(report.contains(" 25.0%"));
        assert!(report.contains(" 62.5%"));
        assert!(report.contains("Total"));
        assert!(report.contains("# general"));
        assert!(report.contains("@ alice × bob"));
        assert!(!report.contains("Not enough data"));
    }

    #[tokio::test]
    async fn messages_reports_not_enough_data() {
        let base = serve(reporting_server(json!([]))).await;

        let range = PeriodSelection::Last30.resolve();
        let view = fetch_section(&Endpoint::new(&base), &range).await.unwrap();
        assert_eq!(view.state_name(), "empty");

        let report = render_report(PeriodSelection::Last30, &range, &view);
        assert!(report.contains("Not enough data"));
        // The pie still renders.
        assert!(report.contains("Public channels"));
    }

    #[tokio::test]
    async fn messages_run_prints_json() {
        let base = serve(reporting_server(json!([
            {"t": "c", "messages": 3, "name": "ops"}
        ])))
        .await;

        let result = run(&Endpoint::new(&base), PeriodSelection::Last90, true).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn messages_fails_on_api_error() {
        let app = Router::new()
            .route(
                ORIGIN_PATH,
                get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "") }),
            )
            .route(TOP_CHANNELS_PATH, get(|| async { Json(json!({"channels": []})) }));
        let base = serve(app).await;

        let err = fetch_section(&Endpoint::new(&base), &PeriodSelection::Last7.resolve())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"), "got: {err}");
    }

    #[tokio::test]
    async fn messages_hints_at_credentials_on_unauthorized() {
        let app = Router::new()
            .route(
                ORIGIN_PATH,
                get(|| async { (axum::http::StatusCode::UNAUTHORIZED, "") }),
            )
            .route(
                TOP_CHANNELS_PATH,
                get(|| async { (axum::http::StatusCode::UNAUTHORIZED, "") }),
            );
        let base = serve(app).await;

        let err = fetch_section(&Endpoint::new(&base), &PeriodSelection::Last7.resolve())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("user_id_env"), "got: {err}");
    }

    #[tokio::test]
    async fn messages_connection_refused_is_friendly() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let endpoint = Endpoint::new(&format!("http://127.0.0.1:{port}"));

        let err = fetch_section(&endpoint, &PeriodSelection::Last7.resolve())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Could not connect"), "got: {err}");
    }

    #[test]
    fn report_for_loading_view_stops_after_header() {
        let range = PeriodSelection::Last7.resolve();
        let report = render_report(PeriodSelection::Last7, &range, &SectionView::Loading);
        assert!(report.contains("Loading..."));
        assert!(!report.contains("Total"));
    }
}
