use serde::Serialize;

/// [ntext responder](ntex::web::HttpResponse) to redirect to `url`
pub fn redirect_to(url: &str) -> Result<ntex::web::HttpResponse, ntex::web::Error> {
    Ok(ntex::web::HttpResponse::Found()
        .header("location", url)
        .finish())
}

/// Serializes `value` so it can be embedded in a
/// `<script type="application/json">` element.
pub fn json_script(value: &impl Serialize) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003C")
        .replace('>', "\\u003E")
        .replace('&', "\\u0026"))
}

/// Path the browser came from, when it points back to this site
pub fn same_site_referer(req: &ntex::web::HttpRequest, host: &str) -> Option<String> {
    let referer = req.headers().get("referer")?.to_str().ok()?;
    let path = referer
        .split_once("://")
        .map(|(_, rest)| rest)
        .and_then(|rest| rest.strip_prefix(host))
        .unwrap_or(referer);

    (path.starts_with('/') && !path.starts_with("//")).then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::web::test::TestRequest;

    #[test]
    fn test_json_script_escapes_markup() {
        assert_eq!(
            json_script(&"pi_1</script><script>").unwrap(),
            r#""pi_1\u003C/script\u003E\u003Cscript\u003E""#
        );
        assert_eq!(json_script(&"pk_test_1").unwrap(), r#""pk_test_1""#);
    }

    #[test]
    fn test_same_site_referer() {
        let req = TestRequest::default()
            .header("referer", "http://localhost:8080/products/3")
            .to_http_request();
        assert_eq!(
            same_site_referer(&req, "localhost:8080"),
            Some("/products/3".to_string())
        );

        let req = TestRequest::default()
            .header("referer", "https://evil.example/products/3")
            .to_http_request();
        assert_eq!(same_site_referer(&req, "localhost:8080"), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(same_site_referer(&req, "localhost:8080"), None);
    }
}
