use super::templates;
use derive_more::{Display, Error};
use log::error;
use ntex::{http, web};

#[derive(Debug, Display, Error)]
pub enum UserError {
    UrlNotFound,
    Unauthorized,
    FormInputValueError(#[error(not(source))] String),
}

impl web::error::WebResponseError for UserError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        let mut context = tera::Context::new();
        error!("{:#?}", self);

        let template_name = match self {
            UserError::UrlNotFound => {
                context.insert("msg_details", "page not found");
                "errors/url_not_found.html"
            }
            UserError::Unauthorized => {
                context.insert("msg_details", "please sign in to continue");
                "errors/need_login.html"
            }
            UserError::FormInputValueError(msg) => {
                context.insert("msg_details", &format!("invalid form values: {}", msg));
                "errors/invalid_input_values.html"
            }
        };

        web::HttpResponse::build(self.status_code())
            .set_header("content-type", "text/html; charset=utf-8")
            .body(
                templates::WEB_TEMPLATES
                    .render(template_name, &context)
                    .unwrap_or(self.to_string()),
            )
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            UserError::UrlNotFound => http::StatusCode::NOT_FOUND,
            UserError::Unauthorized => http::StatusCode::UNAUTHORIZED,
            UserError::FormInputValueError(_) => http::StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ServerError {
    TemplateError(#[error(not(source))] String),
    ExternalServiceError(#[error(not(source))] String),
    InternalServerError(#[error(not(source))] String),
    InvalidCsrfToken,
}

impl ServerError {
    fn get_error_message(&self) -> String {
        match self {
            ServerError::TemplateError(msg) => format!("[TemplateError] {:#?}", msg),
            ServerError::ExternalServiceError(msg) => format!("[ExternalServiceError] {:#?}", msg),
            ServerError::InternalServerError(msg) => format!("[InternalServerError] {:#?}", msg),
            ServerError::InvalidCsrfToken => "[InvalidCsrfToken]".to_string(),
        }
    }
}

impl web::error::WebResponseError for ServerError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{}", self.get_error_message());

        let template_name = match self {
            ServerError::InvalidCsrfToken => "errors/csrf_failure.html",
            _ => "errors/internal_error.html",
        };

        web::HttpResponse::build(self.status_code())
            .set_header("content-type", "text/html; charset=utf-8")
            .body(
                templates::WEB_TEMPLATES
                    .render(template_name, &tera::Context::new())
                    .unwrap_or(self.to_string()),
            )
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            ServerError::InvalidCsrfToken => http::StatusCode::FORBIDDEN,
            _ => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::web::WebResponseError;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            UserError::UrlNotFound.status_code(),
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            UserError::FormInputValueError("email".into()).status_code(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::InvalidCsrfToken.status_code(),
            http::StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServerError::TemplateError("boom".into()).status_code(),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
