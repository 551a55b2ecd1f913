use actix_web::{http::StatusCode, test, web, App, HttpRequest, HttpResponse};
use kit_http::{JsonWriter, Problem, ProblemBuilder, Reader};
use kit_validator::{Fields, Validate, Validator};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("order {0} not found")]
struct OrderNotFound(u32);

#[derive(Debug, Serialize, Deserialize)]
struct Order {
    id: u32,
    item: String,
}

impl Validate for Order {
    fn fields(&self, fields: &mut Fields) {
        fields
            .field("id", &self.id, "gt=0")
            .field("item", &self.item, "required");
    }
}

fn not_found_mapper(err: &anyhow::Error) -> Option<Box<dyn Problem + Send>> {
    let err = err.downcast_ref::<OrderNotFound>()?;
    Some(Box::new(
        ProblemBuilder::new()
            .with_type("https://example.com/probs/order-not-found")
            .with_title("Order not found")
            .with_status(StatusCode::NOT_FOUND)
            .with_detail(err.to_string())
            .with_custom_member("order_id", err.0)
            .build(),
    ))
}

fn routes(writer: JsonWriter, reader: Reader) -> impl Fn(&mut web::ServiceConfig) {
    move |cfg| {
        let orders = reader.typed::<Order>();
        cfg.route(
            "/orders",
            web::post().to(writer.handler(move |_req: HttpRequest, payload: web::Payload| {
                let orders = orders.clone();
                async move {
                    let order = orders.read_and_validate_json(payload).await?;
                    Ok::<_, anyhow::Error>(HttpResponse::Created().json(order))
                }
            })),
        )
        .route(
            "/orders/{id}",
            web::get().to(writer.handler(|req: HttpRequest, _: web::Payload| async move {
                let id: u32 = req.match_info().query("id").parse()?;
                Err::<HttpResponse, _>(anyhow::Error::new(OrderNotFound(id)).context("loading order"))
            })),
        );
    }
}

#[actix_web::test]
async fn test_handler_success() {
    let writer = JsonWriter::new();
    let app = test::init_service(
        App::new().configure(routes(writer, Reader::new(Validator::new()))),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(serde_json::json!({ "id": 7, "item": "book" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["item"], "book");
}

#[actix_web::test]
async fn test_handler_renders_validation_problem_with_instance() {
    let writer = JsonWriter::new();
    let app = test::init_service(
        App::new().configure(routes(writer, Reader::new(Validator::new()))),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/orders?source=test")
        .set_json(serde_json::json!({ "id": 0, "item": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["instance"], "/orders?source=test");
    assert_eq!(body["errors"]["id"]["rule"], "gt");
    assert_eq!(body["errors"]["item"]["rule"], "required");
    assert_eq!(body["errors"]["item"]["message"], "item is required");
}

#[actix_web::test]
async fn test_handler_uses_error_problem_mapper() {
    let writer = JsonWriter::new().with_error_problem_mapper(not_found_mapper);
    let app = test::init_service(
        App::new().configure(routes(writer, Reader::new(Validator::new()))),
    )
    .await;

    let req = test::TestRequest::get().uri("/orders/42").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "https://example.com/probs/order-not-found");
    assert_eq!(body["title"], "Order not found");
    assert_eq!(body["detail"], "order 42 not found");
    assert_eq!(body["order_id"], 42);
    assert_eq!(body["instance"], "/orders/42");
}

#[actix_web::test]
async fn test_unmapped_error_is_generic_500() {
    let writer = JsonWriter::new().with_error_problem_mapper(not_found_mapper);
    let app = test::init_service(
        App::new().configure(routes(writer, Reader::new(Validator::new()))),
    )
    .await;

    let req = test::TestRequest::get().uri("/orders/forty-two").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "about:blank");
    assert_eq!(body["title"], "Internal Server Error");
    assert_eq!(body["detail"], "Internal Server Error");
}

#[actix_web::test]
async fn test_write_problem() {
    let req = test::TestRequest::get().uri("/quota").to_http_request();
    let problem = ProblemBuilder::new()
        .with_status(StatusCode::TOO_MANY_REQUESTS)
        .with_detail("Try again in a minute")
        .build();

    let resp = JsonWriter::new().write_problem(&req, &problem);
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "type": "about:blank",
            "title": "Too Many Requests",
            "status": 429,
            "detail": "Try again in a minute",
            "instance": "/quota",
        })
    );
}
