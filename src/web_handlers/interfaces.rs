use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use log::{debug, error};
use serde::Deserialize;

use crate::interfaces::{subscribe, SubscribeRequest};
use crate::models::AppState;

/// Query parameters of a subscription request
#[derive(Deserialize, Debug, Default, Clone)]
pub struct SubscribeQuery {
    /// Subscription token, when not given in the path
    pub token: Option<String>,
    /// Target format
    pub target: Option<String>,
    /// Alias of `target` used by older panel links
    pub flag: Option<String>,
}

impl SubscribeQuery {
    fn selector(&self) -> Option<&str> {
        self.target.as_deref().or(self.flag.as_deref())
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Public URL the client used to reach us
fn request_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), req.uri())
}

fn respond(
    req: &HttpRequest,
    token: &str,
    query: &SubscribeQuery,
    app_state: &AppState,
) -> HttpResponse {
    let user_agent = req
        .headers()
        .get("User-Agent")
        .and_then(|value| value.to_str().ok());
    let subscription_url = request_url(req);
    debug!(
        "Received subscription request: target={:?} ua={:?}",
        query.selector(),
        user_agent
    );

    let request = SubscribeRequest {
        token,
        target: query.selector(),
        user_agent,
        subscription_url: Some(&subscription_url),
        now: unix_now(),
    };

    match subscribe(&app_state.context(), &request) {
        Ok(result) => {
            let mut resp = HttpResponse::Ok();

            // Add headers from result
            for (name, value) in result.headers {
                resp.append_header((name, value));
            }

            resp.body(result.document.body)
        }
        Err(e) => {
            if e.status_code() >= 500 {
                error!("Subscription error: {}", e);
            }
            e.error_response()
        }
    }
}

/// Handler for `/sub/{token}`
pub async fn sub_handler(
    req: HttpRequest,
    path: web::Path<(String,)>,
    query: web::Query<SubscribeQuery>,
    app_state: web::Data<Arc<AppState>>,
) -> HttpResponse {
    respond(&req, &path.0, &query, &app_state)
}

/// Handler for `/sub?token=...`
pub async fn sub_query_handler(
    req: HttpRequest,
    query: web::Query<SubscribeQuery>,
    app_state: web::Data<Arc<AppState>>,
) -> HttpResponse {
    let token = query.token.clone().unwrap_or_default();
    respond(&req, &token, &query, &app_state)
}

/// Register the API endpoints with Actix Web
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/sub", web::get().to(sub_query_handler))
        .route("/sub/{token}", web::get().to(sub_handler));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FirstShortId;
    use crate::settings::Settings;
    use crate::store::FileStore;
    use actix_web::{http::StatusCode, test, App};

    const DATA: &str = r#"
users:
  - id: 1
    token: alpha
    passwd: secret
    transfer_enable: 1073741824
  - id: 2
    token: expired
    expire_time: 1
nodes:
  - { id: 10, name: 香港 01, type: trojan, server: hk.example.com }
"#;

    fn state() -> web::Data<Arc<AppState>> {
        let store = FileStore::from_str_with_extension(DATA, "yaml").unwrap();
        let state = AppState::new(Settings::default(), store)
            .with_short_id_selector(Box::new(FirstShortId));
        web::Data::new(Arc::new(state))
    }

    #[actix_web::test]
    async fn test_clash_subscription() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;
        let req = test::TestRequest::get()
            .uri("/sub/alpha?target=clash")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Subscription-Userinfo").unwrap(),
            "upload=0; download=0; total=1073741824; expire=0"
        );
        assert_eq!(resp.headers().get("Content-Type").unwrap(), "text/yaml");
        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("香港 01"));
        assert!(body.contains("🇭🇰 香港节点"));
    }

    #[actix_web::test]
    async fn test_query_token_and_user_agent() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;
        let req = test::TestRequest::get()
            .uri("/sub?token=alpha")
            .insert_header(("User-Agent", "sing-box 1.10.0"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }

    #[actix_web::test]
    async fn test_refusals() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;

        let cases = [
            ("/sub/nobody", StatusCode::UNAUTHORIZED),
            ("/sub/expired", StatusCode::FORBIDDEN),
            ("/sub/alpha?flag=loon", StatusCode::BAD_REQUEST),
            ("/sub", StatusCode::UNAUTHORIZED),
        ];
        for (uri, status) in cases {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), status, "{}", uri);
        }
    }
}
