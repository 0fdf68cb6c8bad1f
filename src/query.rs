//! PSAの検索条件（conditions文字列）の組み立て
//!
//! 日付の書式と括弧付けはすべてこのモジュールに集約する。

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// PSAの日付書式（ゼロ埋めなし `Y-M-D`）
pub fn format_psa_date(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// `today` から `days` 日前の日付。符号はどちらでも「過去N日」として扱う
///
/// 日付の範囲を超える日数は `InvalidInput`。
pub fn days_ago(today: NaiveDate, days: i64) -> Result<NaiveDate> {
    days.checked_abs()
        .and_then(Duration::try_days)
        .and_then(|delta| today.checked_sub_signed(delta))
        .ok_or_else(|| Error::InvalidInput(format!("day count out of range: {}", days)))
}

/// 検索条件を構成する単一の述語
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Open,
    Board(i64),
    NotBoard(i64),
    RecordType(String),
    EnteredOnOrAfter(NaiveDate),
    EnteredOnOrBefore(NaiveDate),
    EnteredBefore(NaiveDate),
    NotUpdatedSince(NaiveDate),
    Assigned,
    Unassigned,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Open => write!(f, "ClosedFlag = False"),
            Predicate::Board(id) => write!(f, "Board/ID = {}", id),
            Predicate::NotBoard(id) => write!(f, "Board/ID != {}", id),
            Predicate::RecordType(record_type) => write!(f, "recordType = '{}'", record_type),
            Predicate::EnteredOnOrAfter(date) => {
                write!(f, "dateEntered >= [{}]", format_psa_date(*date))
            }
            Predicate::EnteredOnOrBefore(date) => {
                write!(f, "dateEntered <= [{}]", format_psa_date(*date))
            }
            Predicate::EnteredBefore(date) => {
                write!(f, "dateEntered < [{}]", format_psa_date(*date))
            }
            Predicate::NotUpdatedSince(date) => {
                write!(f, "_info/LastUpdated <= [{}]", format_psa_date(*date))
            }
            Predicate::Assigned => write!(f, "resources LIKE '*'"),
            Predicate::Unassigned => write!(f, "resources = NULL"),
        }
    }
}

/// `AND` で結合された述語の列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    predicates: Vec<Predicate>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", predicate)?;
        }
        Ok(())
    }
}

/// 検索エンドポイントへのPOSTボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketQuery {
    #[serde(rename = "orderBy")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    pub conditions: String,
}

impl TicketQuery {
    pub fn new(conditions: impl Into<String>) -> Self {
        Self {
            order_by: None,
            conditions: conditions.into(),
        }
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!(self)
    }
}

impl From<Condition> for TicketQuery {
    fn from(condition: Condition) -> Self {
        TicketQuery::new(condition.to_string())
    }
}

// 各レポートの条件。日付計算の基準日は呼び出し側から渡す

pub fn open_by_board(board_id: i64) -> Condition {
    Condition::new()
        .and(Predicate::Open)
        .and(Predicate::Board(board_id))
}

pub fn new_by_board(board_id: i64, days: i64, today: NaiveDate) -> Result<Condition> {
    Ok(Condition::new()
        .and(Predicate::EnteredOnOrAfter(days_ago(today, days)?))
        .and(Predicate::Board(board_id)))
}

pub fn open_by_board_older_than(board_id: i64, days: i64, today: NaiveDate) -> Result<Condition> {
    Ok(Condition::new()
        .and(Predicate::Open)
        .and(Predicate::EnteredOnOrBefore(days_ago(today, days)?))
        .and(Predicate::Board(board_id)))
}

pub fn open_by_board_not_updated_in(
    board_id: i64,
    days: i64,
    today: NaiveDate,
) -> Result<Condition> {
    Ok(Condition::new()
        .and(Predicate::Open)
        .and(Predicate::NotUpdatedSince(days_ago(today, days)?))
        .and(Predicate::Board(board_id)))
}

pub fn open_assigned_by_board(board_id: i64) -> Condition {
    open_by_board(board_id).and(Predicate::Assigned)
}

pub fn open_unassigned_by_board(board_id: i64) -> Condition {
    open_by_board(board_id).and(Predicate::Unassigned)
}

pub fn open() -> Condition {
    Condition::new().and(Predicate::Open)
}

pub fn open_older_than(days: i64, today: NaiveDate) -> Result<Condition> {
    Ok(open().and(Predicate::EnteredOnOrBefore(days_ago(today, days)?)))
}

/// `start` 以上 `end` 未満に登録されたサービスチケット
pub fn entered_between(start: NaiveDate, end: NaiveDate) -> Condition {
    Condition::new()
        .and(Predicate::RecordType("ServiceTicket".to_string()))
        .and(Predicate::EnteredOnOrAfter(start))
        .and(Predicate::EnteredBefore(end))
}
