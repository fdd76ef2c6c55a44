mod common;

use std::collections::HashMap;
use std::time::Duration;

use common::{Capture, get, message, request_id};
use http::{Method, StatusCode};
use rlog::logger;
use rlog::middleware::RequestLogging;
use rlog::{Request, Response, Router};
use tracing::Level;

#[tokio::test]
async fn handler_logs_share_the_request_id() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::DEBUG)).wrap(|req: Request| async move {
        logger::from_context(req.context()).info("handle request");
        "ok"
    });

    let res = svc.call(get("/")).await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let records = capture.records();
    assert_eq!(records.len(), 3, "{records:#?}");

    let messages: Vec<_> = records.iter().map(message).collect();
    assert_eq!(messages, ["New request", "handle request", "The request is handled"]);

    let id = request_id(&records[0]).expect("requestID on entry record");
    assert_eq!(id.len(), 36);
    for record in &records {
        assert_eq!(request_id(record), Some(id));
    }
}

#[tokio::test]
async fn records_carry_method_url_status_and_duration() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::DEBUG))
        .wrap(|_req: Request| async { Response::text("hello") });

    svc.call(get("/greet?name=alice")).await;

    let records = capture.records();
    let (entry, exit) = (&records[0], &records[1]);

    assert_eq!(entry["level"], "INFO");
    assert_eq!(entry["method"], "GET");
    assert_eq!(entry["url"], "/greet?name=alice");

    assert_eq!(exit["level"], "DEBUG");
    assert_eq!(exit["httpStatus"], 200);
    assert!(exit["duration"].as_str().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn handler_without_lookup_still_gets_two_records() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::DEBUG))
        .wrap(|_req: Request| async { Response::builder().no_body() });

    let res = svc.call(get("/quiet")).await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let records = capture.records();
    assert_eq!(records.len(), 2);
    assert!(request_id(&records[0]).is_some());
    assert_eq!(request_id(&records[0]), request_id(&records[1]));
}

#[tokio::test]
async fn reports_the_status_the_handler_chose() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::DEBUG))
        .wrap(|_req: Request| async { StatusCode::CREATED });

    let res = svc.call(get("/things")).await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(capture.records()[1]["httpStatus"], 201);
}

#[tokio::test]
async fn completion_is_filtered_at_info() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::INFO))
        .wrap(|_req: Request| async { "ok" });

    svc.call(get("/")).await;

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(message(&records[0]), "New request");
}

#[tokio::test]
async fn completion_level_is_configurable() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::INFO))
        .completion_level(Level::INFO)
        .wrap(|_req: Request| async { "ok" });

    svc.call(get("/")).await;

    let records = capture.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["level"], "INFO");
    assert_eq!(message(&records[1]), "The request is handled");
}

#[tokio::test]
async fn concurrent_requests_group_by_request_id() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::DEBUG)).wrap(|req: Request| async move {
        let log = logger::from_context(req.context());
        let delay = req.uri().path().trim_start_matches('/').parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        log.info("slept");
        "ok"
    });

    tokio::join!(svc.call(get("/30")), svc.call(get("/0")), svc.call(get("/15")));

    let mut by_id: HashMap<String, Vec<String>> = HashMap::new();
    for record in capture.records() {
        let id = request_id(&record).expect("every record is request-scoped").to_owned();
        by_id.entry(id).or_default().push(message(&record).to_owned());
    }

    assert_eq!(by_id.len(), 3);
    for messages in by_id.values() {
        assert_eq!(messages, &["New request", "slept", "The request is handled"]);
    }
}

#[tokio::test]
async fn wrappers_compose() {
    let outer = Capture::default();
    let inner = Capture::default();

    let svc = RequestLogging::new(outer.logger(Level::DEBUG)).wrap(
        RequestLogging::new(inner.logger(Level::DEBUG)).wrap(|_req: Request| async { "ok" }),
    );

    svc.call(get("/")).await;

    let (outer, inner) = (outer.records(), inner.records());
    assert_eq!(outer.len(), 2);
    assert_eq!(inner.len(), 2);
    assert_ne!(request_id(&outer[0]), request_id(&inner[0]));
}

#[tokio::test]
async fn router_layer_logs_matched_and_unmatched_routes() {
    let capture = Capture::default();
    let svc = Router::new()
        .on(Method::GET, "/users/{id}", |req: Request| async move {
            let log = logger::from_context(req.context());
            let id = req.param("id").unwrap_or("?").to_owned();
            log.in_scope(|| tracing::info!(user = %id, "loading user"));
            Response::json(format!(r#"{{"id":"{id}"}}"#))
        })
        .layer(RequestLogging::new(capture.logger(Level::DEBUG)))
        .into_service();

    assert_eq!(svc.call(get("/users/7")).await.status_code(), StatusCode::OK);
    assert_eq!(svc.call(get("/nowhere")).await.status_code(), StatusCode::NOT_FOUND);

    let records = capture.records();
    assert_eq!(records.len(), 5);
    assert_eq!(records[1]["user"], "7");
    assert_eq!(records[2]["httpStatus"], 200);
    assert_eq!(records[3]["url"], "/nowhere");
    assert_eq!(records[4]["httpStatus"], 404);
}

#[tokio::test]
async fn lookup_without_middleware_is_silent() {
    let capture = Capture::default();
    let svc = Router::new()
        .on(Method::GET, "/", |req: Request| async move {
            let log = logger::from_context(req.context());
            log.error("nobody hears this");
            log.info("nor this");
            if log.is_nop() { "nop" } else { "real" }
        })
        .into_service();

    // A live default subscriber: anything the fallback logger leaked would
    // land in `capture`.
    let _guard = tracing::dispatcher::set_default(&capture.dispatch(Level::TRACE));

    let res = svc.call(get("/")).await;
    assert_eq!(res.body().as_ref(), b"nop");
    assert!(capture.records().is_empty(), "{:#?}", capture.records());

    tracing::info!("the default subscriber is live");
    assert_eq!(capture.records().len(), 1);
}

#[tokio::test]
async fn request_id_survives_a_warn_filter() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::WARN)).wrap(|req: Request| async move {
        let log = logger::from_context(req.context());
        log.warn("cache cold");
        log.error("db down");
        StatusCode::SERVICE_UNAVAILABLE
    });

    let res = svc.call(get("/orders")).await;
    assert_eq!(res.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let records = capture.records();
    let messages: Vec<_> = records.iter().map(message).collect();
    assert_eq!(messages, ["cache cold", "db down"]);

    let id = request_id(&records[0]).expect("requestID on WARN record");
    assert_eq!(request_id(&records[1]), Some(id));
    assert_eq!(records[1]["level"], "ERROR");
}

#[tokio::test]
async fn request_id_survives_an_error_filter() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::ERROR)).wrap(|req: Request| async move {
        logger::from_context(req.context()).error("db down");
        "ok"
    });

    svc.call(get("/")).await;

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert!(request_id(&records[0]).is_some_and(|id| id.len() == 36));
}

#[tokio::test]
async fn completion_can_drop_to_trace() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::TRACE))
        .completion_level(Level::TRACE)
        .wrap(|_req: Request| async { "ok" });

    svc.call(get("/")).await;

    let records = capture.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["level"], "TRACE");
}

#[tokio::test]
async fn helper_records_use_the_logger_target() {
    let capture = Capture::default();
    let svc = RequestLogging::new(capture.logger(Level::INFO)).wrap(|req: Request| async move {
        let log = logger::from_context(req.context());
        log.info("via helper");
        log.in_scope(|| tracing::info!("via macro"));
        "ok"
    });

    svc.call(get("/")).await;

    let records = capture.records();
    assert_eq!(message(&records[1]), "via helper");
    assert_eq!(records[1]["target"], "rlog::logger");
    assert_eq!(message(&records[2]), "via macro");
    assert_eq!(records[2]["target"], module_path!());
}
