use std::collections::BTreeSet;
use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::SraMetaError;

pub const DEFAULT_BUCKET: &str = "genomeark";

/// Object-storage listing with `/` as the delimiter.
pub trait ObjectStore {
    /// Immediate child prefixes of `prefix`, each ending in `/`.
    fn list_subprefixes(&self, prefix: &str) -> Result<Vec<String>, SraMetaError>;
    /// Keys directly under `prefix` (not in a child prefix).
    fn list_object_keys(&self, prefix: &str) -> Result<Vec<String>, SraMetaError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn list_subprefixes(&self, prefix: &str) -> Result<Vec<String>, SraMetaError> {
        (**self).list_subprefixes(prefix)
    }

    fn list_object_keys(&self, prefix: &str) -> Result<Vec<String>, SraMetaError> {
        (**self).list_object_keys(prefix)
    }
}

/// Keys held in memory, listed with the same delimiter semantics as S3.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    keys: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    fn children<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keys
            .range(prefix.to_string()..)
            .take_while(move |key| key.starts_with(prefix))
            .map(move |key| &key[prefix.len()..])
            .filter(|rest| !rest.is_empty())
    }
}

impl ObjectStore for MemoryStore {
    fn list_subprefixes(&self, prefix: &str) -> Result<Vec<String>, SraMetaError> {
        let prefixes = self
            .children(prefix)
            .filter_map(|rest| rest.find('/').map(|idx| format!("{prefix}{}", &rest[..=idx])))
            .collect::<BTreeSet<_>>();
        Ok(prefixes.into_iter().collect())
    }

    fn list_object_keys(&self, prefix: &str) -> Result<Vec<String>, SraMetaError> {
        Ok(self
            .children(prefix)
            .filter(|rest| !rest.contains('/'))
            .map(|rest| format!("{prefix}{rest}"))
            .collect())
    }
}

/// One page of a ListObjectsV2 response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub common_prefixes: Vec<String>,
    pub next_continuation_token: Option<String>,
}

/// Anonymous ListObjectsV2 client for a public bucket.
#[derive(Clone)]
pub struct S3HttpStore {
    client: Client,
    base_url: String,
}

impl S3HttpStore {
    pub fn new(bucket: &str, endpoint: Option<&str>) -> Result<Self, SraMetaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gark-sra/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SraMetaError::StorageHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| SraMetaError::StorageHttp(err.to_string()))?;
        let base_url = match endpoint {
            Some(endpoint) => format!("{}/{bucket}", endpoint.trim_end_matches('/')),
            None => format!("https://{bucket}.s3.amazonaws.com"),
        };
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, SraMetaError> {
        let mut query = vec![
            ("list-type", "2"),
            ("delimiter", "/"),
            ("prefix", prefix),
        ];
        if let Some(token) = continuation_token {
            query.push(("continuation-token", token));
        }
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&query)
            .send()
            .map_err(|err| SraMetaError::StorageHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "storage request failed".to_string());
            return Err(SraMetaError::StorageStatus { status, message });
        }
        let body = response
            .text()
            .map_err(|err| SraMetaError::StorageHttp(err.to_string()))?;
        parse_list_response(&body)
    }

    fn list_all(&self, prefix: &str) -> Result<ListPage, SraMetaError> {
        let mut merged = ListPage::default();
        let mut token: Option<String> = None;
        loop {
            let page = self.list_page(prefix, token.as_deref())?;
            merged.keys.extend(page.keys);
            merged.common_prefixes.extend(page.common_prefixes);
            match page.next_continuation_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        debug!(
            prefix,
            keys = merged.keys.len(),
            prefixes = merged.common_prefixes.len(),
            "listed bucket prefix"
        );
        Ok(merged)
    }
}

impl ObjectStore for S3HttpStore {
    fn list_subprefixes(&self, prefix: &str) -> Result<Vec<String>, SraMetaError> {
        Ok(self.list_all(prefix)?.common_prefixes)
    }

    fn list_object_keys(&self, prefix: &str) -> Result<Vec<String>, SraMetaError> {
        let keys = self
            .list_all(prefix)?
            .keys
            .into_iter()
            .filter(|key| key.len() > prefix.len())
            .collect();
        Ok(keys)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Key,
    CommonPrefix,
    Truncated,
    NextToken,
}

/// Parses a ListObjectsV2 `ListBucketResult` document.
pub fn parse_list_response(xml: &str) -> Result<ListPage, SraMetaError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut page = ListPage::default();
    let mut truncated = false;
    let mut token = None;
    let mut in_contents = false;
    let mut in_common_prefixes = false;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"Contents" => in_contents = true,
                b"CommonPrefixes" => in_common_prefixes = true,
                b"Key" if in_contents => field = Some(Field::Key),
                b"Prefix" if in_common_prefixes => field = Some(Field::CommonPrefix),
                b"IsTruncated" => field = Some(Field::Truncated),
                b"NextContinuationToken" => field = Some(Field::NextToken),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if let Some(current) = field {
                    let text = e
                        .unescape()
                        .map_err(|err| SraMetaError::StorageParse(err.to_string()))?
                        .into_owned();
                    match current {
                        Field::Key => page.keys.push(text),
                        Field::CommonPrefix => page.common_prefixes.push(text),
                        Field::Truncated => truncated = text.trim() == "true",
                        Field::NextToken => token = Some(text),
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                match e.name().as_ref() {
                    b"Contents" => in_contents = false,
                    b"CommonPrefixes" => in_common_prefixes = false,
                    _ => {}
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(SraMetaError::StorageParse(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if truncated {
        page.next_continuation_token = token;
    }
    Ok(page)
}
