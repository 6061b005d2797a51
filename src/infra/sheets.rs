//! Thin asynchronous client for the Google Sheets values API (v4).
//!
//! - Reads a fixed column range with unformatted values.
//! - Overwrites a worksheet by writing the full grid from `A1`, then clearing
//!   the rows left below it.
//! - No caching: every read hits the API.

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::{DatasetStore, StoreError};
use crate::domain::Table;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/";
const USER_AGENT: &str = "house-price-predictor/1.0.0";

#[derive(Clone, Debug)]
enum SheetsAuth {
    Anonymous,
    Bearer(String),
    ApiKey(String),
}

#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: Url,
    spreadsheet_id: String,
    auth: SheetsAuth,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: &str) -> Result<Self, StoreError> {
        Self::with_base_url(DEFAULT_BASE_URL, spreadsheet_id)
    }

    pub fn with_base_url(base: &str, spreadsheet_id: &str) -> Result<Self, StoreError> {
        let spreadsheet_id = spreadsheet_id.trim();
        if spreadsheet_id.is_empty() {
            return Err(StoreError::NotConfigured("missing spreadsheet id"));
        }
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            auth: SheetsAuth::Anonymous,
        })
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.auth = SheetsAuth::Bearer(token.to_string());
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.auth = SheetsAuth::ApiKey(key.to_string());
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn values_url(&self, range: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Api(format!("base URL {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            SheetsAuth::Anonymous => builder,
            SheetsAuth::Bearer(token) => builder.bearer_auth(token),
            SheetsAuth::ApiKey(key) => builder.query(&[("key", key.as_str())]),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api(describe_api_error(status.as_u16(), &body)))
    }
}

impl DatasetStore for SheetsClient {
    async fn read(&self, worksheet: &str, columns: &[&str]) -> Result<Table, StoreError> {
        let range = column_range(worksheet, columns.len());
        let url = self.values_url(&range)?;
        log::debug!("event=sheets_read range={range}");

        let response = self
            .send(self.http.get(url).query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
            ]))
            .await?;
        let payload: ValueRange = response.json().await?;
        Ok(Table::from_grid(payload.values).truncate_columns(columns.len()))
    }

    async fn update(&self, worksheet: &str, table: Table) -> Result<(), StoreError> {
        let sheet = quote_sheet(worksheet);
        let width = table.header.len().max(1);

        let range = format!("{sheet}!A1");
        let body = ValueRange {
            range: Some(range.clone()),
            major_dimension: Some("ROWS".to_string()),
            values: table.into_grid(),
        };
        let rows = body.values.len();
        let url = self.values_url(&range)?;
        self.send(
            self.http
                .put(url)
                .query(&[("valueInputOption", "RAW")])
                .json(&body),
        )
        .await?;

        // Rows from a longer previous table would otherwise linger below the new data.
        let stale = format!("{sheet}!A{}:{}", rows + 1, column_letter(width));
        let clear_url = self.values_url(&format!("{stale}:clear"))?;
        self.send(self.http.post(clear_url).json(&serde_json::json!({})))
            .await?;

        log::debug!("event=sheets_update range={range} rows={rows} cleared={stale}");
        Ok(())
    }
}

/// A1 range covering the first `count` columns of a worksheet, e.g. `'House Data'!A:F`.
fn column_range(worksheet: &str, count: usize) -> String {
    let last = column_letter(count.max(1));
    format!("{}!A:{last}", quote_sheet(worksheet))
}

fn quote_sheet(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

/// 1-based column index to spreadsheet letters (1 → A, 27 → AA).
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn describe_api_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let err = envelope.error;
            let code = err.code.unwrap_or(status);
            let message = err
                .message
                .or(err.status)
                .unwrap_or_else(|| "unknown error".to_string());
            format!("{code}: {message}")
        }
        Err(_) if body.trim().is_empty() => format!("{status}: empty response"),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::{
        io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;
    use crate::domain::{records_to_table, DatasetSnapshot, HouseRecord, COLUMNS};

    #[derive(Debug)]
    struct Captured {
        method: String,
        target: String,
        authorization: Option<String>,
        body: String,
    }

    /// Answers one connection per scripted `(status, body)` reply and hands back
    /// every request it saw, in order.
    async fn stub_server(replies: Vec<(u16, String)>) -> (String, JoinHandle<Vec<Captured>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/v4/", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut captured = Vec::new();
            for (status, reply) in replies {
                let (stream, _) = listener.accept().await.unwrap();
                let mut reader = BufReader::new(stream);

                let mut request_line = String::new();
                reader.read_line(&mut request_line).await.unwrap();
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let target = parts.next().unwrap_or_default().to_string();

                let mut authorization = None;
                let mut length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        let value = value.trim().to_string();
                        match name.to_ascii_lowercase().as_str() {
                            "authorization" => authorization = Some(value),
                            "content-length" => length = value.parse().unwrap(),
                            _ => {}
                        }
                    }
                }
                let mut body = vec![0; length];
                reader.read_exact(&mut body).await.unwrap();

                let response = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
                    reply.len()
                );
                let mut stream = reader.into_inner();
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();

                captured.push(Captured {
                    method,
                    target,
                    authorization,
                    body: String::from_utf8(body).unwrap(),
                });
            }
            captured
        });
        (base, handle)
    }

    fn house(kt: u32, price: f64) -> HouseRecord {
        HouseRecord {
            bedrooms: kt,
            bathrooms: 2,
            garages: 1,
            land_area: 120.0,
            building_area: 85.0,
            estimated_price: price,
        }
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(6), "F");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(53), "BA");
    }

    #[test]
    fn range_quotes_worksheet_name() {
        assert_eq!(column_range("House Data", 6), "'House Data'!A:F");
        assert_eq!(quote_sheet("Bob's"), "'Bob''s'");
    }

    #[test]
    fn values_url_encodes_range_segment() {
        let client = SheetsClient::with_base_url("http://localhost:9000/v4/", "sheet-1").unwrap();
        let url = client.values_url(&column_range("House Data", 6)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/v4/spreadsheets/sheet-1/values/'House%20Data'!A:F"
        );
    }

    #[test]
    fn value_range_becomes_table() {
        let payload: ValueRange = serde_json::from_value(json!({
            "range": "'House Data'!A1:F3",
            "majorDimension": "ROWS",
            "values": [
                ["kt", "km", "grs", "lt", "lb", "estimated_price"],
                [3, 2, 1, 120, 85, 350000000],
                [2, 1]
            ]
        }))
        .unwrap();
        let table = Table::from_grid(payload.values).truncate_columns(6);
        assert_eq!(table.header.len(), 6);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn empty_sheet_has_no_values_key() {
        let payload: ValueRange =
            serde_json::from_value(json!({ "range": "'House Data'!A1:F1000" })).unwrap();
        assert_eq!(Table::from_grid(payload.values), Table::default());
    }

    #[test]
    fn api_errors_prefer_google_message() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            describe_api_error(403, body),
            "403: The caller does not have permission"
        );
        assert_eq!(describe_api_error(502, ""), "502: empty response");
        assert_eq!(describe_api_error(500, "boom"), "500: boom");
    }

    #[tokio::test]
    async fn update_writes_grid_then_clears_rows_below() {
        let (base, server) = stub_server(vec![(200, "{}".into()), (200, "{}".into())]).await;
        let client = SheetsClient::with_base_url(&base, "sheet-1")
            .unwrap()
            .with_access_token("token-1");
        let table = records_to_table(&[house(3, 350_000_000.0), house(4, 420_000_000.5)]);
        let expected_grid = serde_json::to_value(table.clone().into_grid()).unwrap();

        client.update("House Data", table).await.unwrap();

        let captured = server.await.unwrap();
        assert_eq!(captured.len(), 2);

        let write = &captured[0];
        assert_eq!(write.method, "PUT");
        assert_eq!(
            write.target,
            "/v4/spreadsheets/sheet-1/values/'House%20Data'!A1?valueInputOption=RAW"
        );
        assert_eq!(write.authorization.as_deref(), Some("Bearer token-1"));
        let body: Value = serde_json::from_str(&write.body).unwrap();
        assert_eq!(body["majorDimension"], "ROWS");
        assert_eq!(body["values"], expected_grid);
        assert_eq!(body["values"][0][0], "kt");

        let clear = &captured[1];
        assert_eq!(clear.method, "POST");
        assert_eq!(
            clear.target,
            "/v4/spreadsheets/sheet-1/values/'House%20Data'!A4:F:clear"
        );
        assert_eq!(clear.authorization.as_deref(), Some("Bearer token-1"));
    }

    #[tokio::test]
    async fn read_sends_api_key_and_decodes_rows() {
        let reply = json!({
            "range": "'House Data'!A1:F2",
            "majorDimension": "ROWS",
            "values": [
                ["kt", "km", "grs", "lt", "lb", "estimated_price"],
                [3, 2, 1, 120, 85, 350000000]
            ]
        });
        let (base, server) = stub_server(vec![(200, reply.to_string())]).await;
        let client = SheetsClient::with_base_url(&base, "sheet-1")
            .unwrap()
            .with_api_key("k-123");

        let table = client.read("House Data", &COLUMNS).await.unwrap();
        assert_eq!(
            DatasetSnapshot::from_table(&table).into_records(),
            vec![house(3, 350_000_000.0)]
        );

        let captured = server.await.unwrap();
        let request = &captured[0];
        assert_eq!(request.method, "GET");
        assert!(request
            .target
            .starts_with("/v4/spreadsheets/sheet-1/values/'House%20Data'!A:F?"));
        assert!(request.target.contains("majorDimension=ROWS"));
        assert!(request.target.contains("valueRenderOption=UNFORMATTED_VALUE"));
        assert!(request.target.contains("key=k-123"));
        assert_eq!(request.authorization, None);
    }

    #[tokio::test]
    async fn rejected_write_reports_google_message_and_clears_nothing() {
        let reply = json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        });
        let (base, server) = stub_server(vec![(403, reply.to_string())]).await;
        let client = SheetsClient::with_base_url(&base, "sheet-1").unwrap();

        let err = client
            .update("House Data", records_to_table(&[house(1, 1.0)]))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, StoreError::Api(message) if message == "403: The caller does not have permission"),
            "{err:?}"
        );

        let captured = server.await.unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].method, "PUT");
    }
}
