use crate::domain::model::RawRecord;
use crate::utils::error::{MapError, Result};
use encoding_rs::Encoding;
use reqwest::Client;
use std::time::Duration;

/// A parsed CSV body: header labels plus one record per data row.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

/// Downloads CSV datasets and decodes them from their declared encoding.
#[derive(Debug, Clone)]
pub struct CsvFetcher {
    client: Client,
}

impl CsvFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dp-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str, encoding: &'static Encoding) -> Result<CsvTable> {
        tracing::debug!("GET {} ({})", url, encoding.name());
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        if !status.is_success() {
            return Err(MapError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);

        let text = decode(&body, encoding, url)?;
        parse_csv(&text, url)
    }
}

/// Decodes `bytes`, dropping a leading BOM. Any malformed sequence is fatal.
pub fn decode(bytes: &[u8], encoding: &'static Encoding, source_url: &str) -> Result<String> {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(MapError::ParseError {
            source_url: source_url.to_string(),
            message: format!("content is not valid {}", actual.name()),
        });
    }
    Ok(text.into_owned())
}

pub fn parse_csv(text: &str, source_url: &str) -> Result<CsvTable> {
    let to_parse_error = |e: csv::Error| MapError::ParseError {
        source_url: source_url.to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(to_parse_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(to_parse_error)?;
        let data = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();
        records.push(RawRecord { data });
    }

    Ok(CsvTable { headers, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const AED_CSV: &str = "緯度,経度,名称,住所,設置位置\n31.9100,131.4200,宮崎市役所,宮崎市橘通西1-1-1,1階ロビー\n";

    #[test]
    fn test_decode_shift_jis() {
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(AED_CSV);
        let text = decode(&bytes, encoding_rs::SHIFT_JIS, "test").unwrap();
        assert_eq!(text, AED_CSV);
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("緯度,経度\n".as_bytes());
        let text = decode(&bytes, encoding_rs::UTF_8, "test").unwrap();
        assert_eq!(text, "緯度,経度\n");
    }

    #[test]
    fn test_decode_rejects_invalid_bytes() {
        let err = decode(&[0x82, 0xA0, 0xFF, 0xFF], encoding_rs::UTF_8, "https://example.com/a.csv")
            .unwrap_err();
        assert!(matches!(err, MapError::ParseError { ref source_url, .. } if source_url == "https://example.com/a.csv"));
    }

    #[test]
    fn test_decode_rejects_invalid_shift_jis() {
        let err = decode(&[0x82, 0xA0, 0xFF, 0x81], encoding_rs::SHIFT_JIS, "https://example.com/aed.csv")
            .unwrap_err();
        match err {
            MapError::ParseError { message, .. } => assert!(message.contains("Shift_JIS")),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_a_network_error() {
        let fetcher = CsvFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch("http://127.0.0.1:1/x.csv", encoding_rs::UTF_8)
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::NetworkError(_)));
    }

    #[test]
    fn test_parse_csv_keys_cells_by_header() {
        let table = parse_csv(AED_CSV, "test").unwrap();
        assert_eq!(table.headers, vec!["緯度", "経度", "名称", "住所", "設置位置"]);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].get("名称"), Some("宮崎市役所"));
        assert_eq!(table.records[0].get("設置位置"), Some("1階ロビー"));
    }

    #[test]
    fn test_parse_csv_tolerates_short_rows() {
        let table = parse_csv("緯度,経度,名称\n31.9,131.4\n", "test").unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].get("名称"), None);
    }

    #[tokio::test]
    async fn test_fetch_decodes_shift_jis_body() {
        let server = MockServer::start();
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(AED_CSV);
        let body = bytes.into_owned();

        let csv_mock = server.mock(|when, then| {
            when.method(GET).path("/aed.csv");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body(body);
        });

        let fetcher = CsvFetcher::new(Duration::from_secs(5)).unwrap();
        let table = fetcher
            .fetch(&server.url("/aed.csv"), encoding_rs::SHIFT_JIS)
            .await
            .unwrap();

        csv_mock.assert();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].get("住所"), Some("宮崎市橘通西1-1-1"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_fatal() {
        let server = MockServer::start();
        let csv_mock = server.mock(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404);
        });

        let fetcher = CsvFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch(&server.url("/missing.csv"), encoding_rs::UTF_8)
            .await
            .unwrap_err();

        csv_mock.assert();
        assert!(matches!(err, MapError::HttpStatusError { status: 404, .. }));
    }
}
