use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// PSAのリスト系エンドポイントで使うページサイズ
pub const PAGE_SIZE: usize = 1000;

/// `pageSize`/`page` を付け替えながら同じリクエストを繰り返し、結果を連結する
///
/// - 空ページ、またはページサイズ未満のページで終了する
/// - ページサイズちょうどのページの後は必ずもう1ページ取得して終端を確認する
/// - ページサイズを超えるページは `Error::InconsistentPage`
/// - 途中のページが失敗した場合はそれまでの結果を捨ててエラーを返す
pub struct Paginator<'a, T: Transport + ?Sized> {
    transport: &'a T,
    page_size: usize,
}

impl<'a, T: Transport + ?Sized> Paginator<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            page_size: PAGE_SIZE,
        }
    }

    /// ページサイズを変更（テストや小さいエンドポイント向け）
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn get_all<R>(&self, path: &str) -> Result<Vec<R>>
    where
        R: DeserializeOwned,
    {
        self.collect(path, None).await
    }

    pub async fn post_all<R>(&self, path: &str, body: &serde_json::Value) -> Result<Vec<R>>
    where
        R: DeserializeOwned,
    {
        self.collect(path, Some(body)).await
    }

    async fn collect<R>(&self, path: &str, body: Option<&serde_json::Value>) -> Result<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let page_path = paged_path(path, self.page_size, page);
            let value = match body {
                Some(body) => self.transport.post_json(&page_path, body).await?,
                None => self.transport.get_json(&page_path).await?,
            };
            let batch: Vec<R> = serde_json::from_value(value)?;
            let len = batch.len();
            debug!(path, page, len, "fetched page");

            if len > self.page_size {
                return Err(Error::InconsistentPage {
                    page,
                    len,
                    page_size: self.page_size,
                });
            }

            records.extend(batch);

            if len < self.page_size {
                break;
            }
            page += 1;
        }

        Ok(records)
    }
}

/// 既存のクエリ文字列の有無に応じて `?` か `&` でページングパラメータを付ける
pub fn paged_path(path: &str, page_size: usize, page: u32) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}pageSize={}&page={}", path, separator, page_size, page)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 事前に積んだレスポンスを順に返し、呼び出しを記録するトランスポート
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<serde_json::Value>>>,
        pub(crate) calls: Mutex<Vec<(String, Option<serde_json::Value>)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(self, value: serde_json::Value) -> Self {
            self.responses.lock().unwrap().push_back(Ok(value));
            self
        }

        pub(crate) fn fail(self, error: Error) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn paths(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
        }

        pub(crate) fn bodies(&self) -> Vec<Option<serde_json::Value>> {
            self.calls.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
        }

        fn next(&self, path: &str, body: Option<&serde_json::Value>) -> Result<serde_json::Value> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), body.cloned()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!([])))
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
            self.next(path, None)
        }

        async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
            self.next(path, Some(body))
        }
    }

    pub(crate) fn numbered_page(start: usize, len: usize) -> serde_json::Value {
        json!((start..start + len).collect::<Vec<_>>())
    }

    #[test]
    fn test_paged_path_separator() {
        assert_eq!(
            paged_path("/service/boards", 1000, 1),
            "/service/boards?pageSize=1000&page=1"
        );
        assert_eq!(
            paged_path("/system/members?conditions=x", 1000, 3),
            "/system/members?conditions=x&pageSize=1000&page=3"
        );
    }

    #[tokio::test]
    async fn test_short_last_page_stops_without_extra_call() {
        // Given: 3件、3件、1件のページ（ページサイズ3）
        let transport = ScriptedTransport::new()
            .respond(numbered_page(0, 3))
            .respond(numbered_page(3, 3))
            .respond(numbered_page(6, 1));

        // When
        let records: Vec<usize> = Paginator::new(&transport)
            .page_size(3)
            .get_all("/service/boards")
            .await
            .unwrap();

        // Then: 順序を保って連結され、呼び出し回数はページ数と一致する
        assert_eq!(records, (0..7).collect::<Vec<_>>());
        assert_eq!(transport.call_count(), 3);
        assert_eq!(
            transport.paths(),
            vec![
                "/service/boards?pageSize=3&page=1",
                "/service/boards?pageSize=3&page=2",
                "/service/boards?pageSize=3&page=3",
            ]
        );
    }

    #[tokio::test]
    async fn test_full_pages_require_confirming_empty_page() {
        let transport = ScriptedTransport::new()
            .respond(numbered_page(0, 2))
            .respond(numbered_page(2, 2))
            .respond(json!([]));

        let records: Vec<usize> = Paginator::new(&transport)
            .page_size(2)
            .get_all("/service/boards")
            .await
            .unwrap();

        assert_eq!(records, vec![0, 1, 2, 3]);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_first_page_empty() {
        let transport = ScriptedTransport::new().respond(json!([]));

        let records: Vec<usize> = Paginator::new(&transport)
            .get_all("/service/boards")
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_post_repeats_same_body_on_every_page() {
        let body = json!({ "conditions": "ClosedFlag = False" });
        let transport = ScriptedTransport::new()
            .respond(numbered_page(0, 2))
            .respond(numbered_page(2, 1));

        let records: Vec<usize> = Paginator::new(&transport)
            .page_size(2)
            .post_all("/service/tickets/search", &body)
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(transport.bodies(), vec![Some(body.clone()), Some(body)]);
    }

    #[tokio::test]
    async fn test_oversized_page_is_inconsistent() {
        let transport = ScriptedTransport::new().respond(numbered_page(0, 4));

        let result: Result<Vec<usize>> = Paginator::new(&transport)
            .page_size(3)
            .get_all("/service/boards")
            .await;

        match result.unwrap_err() {
            Error::InconsistentPage {
                page,
                len,
                page_size,
            } => {
                assert_eq!(page, 1);
                assert_eq!(len, 4);
                assert_eq!(page_size, 3);
            }
            other => panic!("Expected InconsistentPage, got {:?}", other),
        }
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_mid_sequence_aborts_fetch() {
        let transport = ScriptedTransport::new()
            .respond(numbered_page(0, 2))
            .fail(Error::ApiError {
                status: 500,
                message: "500 Internal Server Error".to_string(),
            })
            .respond(numbered_page(4, 1));

        let result: Result<Vec<usize>> = Paginator::new(&transport)
            .page_size(2)
            .get_all("/service/boards")
            .await;

        assert!(matches!(result, Err(Error::ApiError { status: 500, .. })));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_page_that_is_not_an_array_is_decode_error() {
        let transport = ScriptedTransport::new().respond(json!({ "code": "NotFound" }));

        let result: Result<Vec<usize>> = Paginator::new(&transport)
            .get_all("/service/boards")
            .await;

        assert!(matches!(result, Err(Error::JsonParsing(_))));
    }
}
