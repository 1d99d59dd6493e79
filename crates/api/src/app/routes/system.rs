use axum::http::StatusCode;
use axum::response::Html;

const INDEX_HTML: &str = r#"
<html>
<body>
    <h1>SmartAir Backend is Running!</h1>
    <p>Backend server is running on port 5000</p>
    <p>Use your frontend HTML file to access the application</p>
</body>
</html>
"#;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
