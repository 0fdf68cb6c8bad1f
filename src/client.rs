use chrono::{Local, NaiveDate};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::config::PsaConfig;
use crate::error::{Error, Result};
use crate::exclusion::BoardExclusions;
use crate::models::{AuditEntry, Board, Member, Ticket};
use crate::paginator::Paginator;
use crate::query::{self, Condition, TicketQuery};
use crate::transport::{HttpTransport, Transport};

pub const BOARDS_ENDPOINT: &str = "/service/boards";
pub const TICKETS_ENDPOINT: &str = "/service/tickets";
pub const TICKET_SEARCH_ENDPOINT: &str = "/service/tickets/search";
pub const MEMBERS_ENDPOINT: &str = "/system/members";
pub const AUDIT_TRAIL_ENDPOINT: &str = "/system/audittrail";

/// アクティブメンバーの固定フィルター
pub const ACTIVE_MEMBERS_CONDITION: &str = "disableOnlineFlag=false AND type/ID!=NULL";

/// PSA（チケット管理）の読み取り専用クライアント
///
/// ボード一覧は最初に必要になった時点で一度だけ取得し、以後キャッシュする。
/// 除外ボードは生成時に解決され、ボードを限定しない検索すべてに適用される。
pub struct PsaClient<T: Transport = HttpTransport> {
    transport: T,
    exclusions: BoardExclusions,
    boards: OnceCell<Vec<Board>>,
}

impl PsaClient<HttpTransport> {
    pub async fn new<S: AsRef<str>>(config: &PsaConfig, excluded_board_names: &[S]) -> Result<Self> {
        let credentials = &config.credentials;
        let transport = HttpTransport::new(
            &config.base_url,
            &credentials.token(),
            &[("clientId", credentials.client_id.as_str())],
        )?;

        Self::with_transport(transport, excluded_board_names).await
    }
}

impl<T: Transport> PsaClient<T> {
    /// 除外ボード名をすべて解決できなければエラー（部分的な除外では起動しない）
    #[instrument(skip_all, fields(excluded = excluded_board_names.len()))]
    pub async fn with_transport<S: AsRef<str>>(
        transport: T,
        excluded_board_names: &[S],
    ) -> Result<Self> {
        let client = Self {
            transport,
            exclusions: BoardExclusions::none(),
            boards: OnceCell::new(),
        };

        if excluded_board_names.is_empty() {
            return Ok(client);
        }

        let exclusions = BoardExclusions::resolve(excluded_board_names, client.boards().await?)?;
        info!(boards = ?exclusions.ids(), "resolved excluded boards");

        Ok(Self {
            exclusions,
            ..client
        })
    }

    pub fn exclusions(&self) -> &BoardExclusions {
        &self.exclusions
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    // ---- boards ----

    pub async fn boards(&self) -> Result<&[Board]> {
        let boards = self
            .boards
            .get_or_try_init(|| async {
                let boards: Vec<Board> = Paginator::new(&self.transport)
                    .get_all(BOARDS_ENDPOINT)
                    .await?;
                debug!(count = boards.len(), "fetched service boards");
                Ok::<_, Error>(boards)
            })
            .await?;
        Ok(boards.as_slice())
    }

    #[instrument(skip(self))]
    pub async fn board_id_by_name(&self, name: &str) -> Result<i64> {
        self.boards()
            .await?
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.id)
            .ok_or_else(|| {
                warn!("service board not found");
                Error::UnknownBoard(name.to_string())
            })
    }

    // ---- tickets ----

    /// 検索条件をそのままPOSTし、全ページを取得する
    pub async fn search_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
        debug!(conditions = %query.conditions, "searching tickets");
        Paginator::new(&self.transport)
            .post_all(TICKET_SEARCH_ENDPOINT, &query.to_body())
            .await
    }

    /// 除外ボードを適用してから検索する
    pub async fn search_tickets_excluding(
        &self,
        condition: &Condition,
        order_by: Option<&str>,
    ) -> Result<Vec<Ticket>> {
        let mut query = TicketQuery::new(self.exclusions.apply(&condition.to_string()));
        if let Some(field) = order_by {
            query = query.order_by(field);
        }
        self.search_tickets(&query).await
    }

    /// フィルターなしのチケット一覧
    pub async fn tickets(&self) -> Result<Vec<Ticket>> {
        Paginator::new(&self.transport)
            .get_all(TICKETS_ENDPOINT)
            .await
    }

    #[instrument(skip(self))]
    pub async fn open_tickets_by_board(&self, board_id: i64) -> Result<Vec<Ticket>> {
        self.search_tickets(&query::open_by_board(board_id).into())
            .await
    }

    /// 直近 `days` 日に登録されたチケット
    #[instrument(skip(self))]
    pub async fn new_tickets_by_board(&self, board_id: i64, days: i64) -> Result<Vec<Ticket>> {
        let condition = query::new_by_board(board_id, days, Self::today())?;
        self.search_tickets(&condition.into()).await
    }

    #[instrument(skip(self))]
    pub async fn open_tickets_by_board_older_than(
        &self,
        board_id: i64,
        days: i64,
    ) -> Result<Vec<Ticket>> {
        let condition = query::open_by_board_older_than(board_id, days, Self::today())?;
        self.search_tickets(&condition.into()).await
    }

    /// `days` 日以上更新されていないオープンチケット
    #[instrument(skip(self))]
    pub async fn open_tickets_by_board_not_updated_in(
        &self,
        board_id: i64,
        days: i64,
    ) -> Result<Vec<Ticket>> {
        let condition = query::open_by_board_not_updated_in(board_id, days, Self::today())?;
        self.search_tickets(&condition.into()).await
    }

    #[instrument(skip(self))]
    pub async fn open_assigned_tickets_by_board(&self, board_id: i64) -> Result<Vec<Ticket>> {
        self.search_tickets(&query::open_assigned_by_board(board_id).into())
            .await
    }

    #[instrument(skip(self))]
    pub async fn open_unassigned_tickets_by_board(&self, board_id: i64) -> Result<Vec<Ticket>> {
        self.search_tickets(&query::open_unassigned_by_board(board_id).into())
            .await
    }

    #[instrument(skip(self))]
    pub async fn open_tickets_by_board_name(&self, name: &str) -> Result<Vec<Ticket>> {
        let board_id = self.board_id_by_name(name).await?;
        self.open_tickets_by_board(board_id).await
    }

    /// 全ボードのオープンチケット（除外ボードを除く）
    #[instrument(skip(self))]
    pub async fn open_tickets(&self) -> Result<Vec<Ticket>> {
        self.search_tickets_excluding(&query::open(), None).await
    }

    #[instrument(skip(self))]
    pub async fn open_tickets_older_than(&self, days: i64) -> Result<Vec<Ticket>> {
        let condition = query::open_older_than(days, Self::today())?;
        self.search_tickets_excluding(&condition, None).await
    }

    /// `start` 以上 `end` 未満に登録されたチケットを登録日順で取得（除外ボードを除く）
    #[instrument(skip(self))]
    pub async fn tickets_entered_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Ticket>> {
        let condition = query::entered_between(start, end);
        self.search_tickets_excluding(&condition, Some("dateEntered"))
            .await
    }

    // ---- members ----

    pub async fn active_members(&self) -> Result<Vec<Member>> {
        let path = format!(
            "{}?conditions={}",
            MEMBERS_ENDPOINT,
            urlencoding::encode(ACTIVE_MEMBERS_CONDITION)
        );
        Paginator::new(&self.transport).get_all(&path).await
    }

    #[instrument(skip(self))]
    pub async fn member_name_by_identifier(&self, identifier: &str) -> Result<String> {
        self.active_members()
            .await?
            .into_iter()
            .find(|m| m.identifier == identifier)
            .map(|m| m.display_name())
            .ok_or_else(|| Error::NotFound(format!("member identifier {}", identifier)))
    }

    // ---- audit trail ----

    /// チケットの監査証跡（ページングなし）
    #[instrument(skip(self))]
    pub async fn ticket_audit_trail(&self, ticket_id: i64) -> Result<Vec<AuditEntry>> {
        let path = format!("{}?type=Ticket&id={}", AUDIT_TRAIL_ENDPOINT, ticket_id);
        let value = self.transport.get_json(&path).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// ヘルプデスクからエスカレーションされた履歴があるか
    pub async fn was_escalated(&self, ticket_id: i64) -> Result<bool> {
        Ok(self
            .ticket_audit_trail(ticket_id)
            .await?
            .iter()
            .any(AuditEntry::is_escalation))
    }
}
