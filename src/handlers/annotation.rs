use actix_web::web::Json;

use crate::core::annotation;
use crate::core::models::score::Annotated;
use crate::error::Error;
use crate::request::AnnotationRequest;

pub async fn annotate(Json(AnnotationRequest { text, detailed_analysis }): Json<AnnotationRequest>) -> Result<Json<Annotated>, Error> {
    Ok(Json(annotation::annotated(&text, &detailed_analysis)))
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_annotate_endpoint() {
        let app = test::init_service(App::new().route("/practice/annotations", web::post().to(annotate))).await;
        let req = test::TestRequest::post()
            .uri("/practice/annotations")
            .set_json(json!({
                "text": "She go <home>",
                "detailedAnalysis": {"grammar": [{"text": "go", "correction": "goes"}]}
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["segments"].as_array().map(|s| s.len()), Some(3));
        assert_eq!(body["segments"][1]["kind"], "error");
        assert_eq!(
            body["html"],
            r#"She <mark class="error error-grammar" tabindex="0" data-correction="goes">go</mark> &lt;home&gt;"#
        );
        assert_eq!(body["counts"][0]["count"], 1);
    }
}
