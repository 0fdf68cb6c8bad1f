use tracing::warn;

use crate::error::{Error, Result};
use crate::models::Board;
use crate::query::Predicate;

/// 全チケット検索から除外するボード
///
/// クライアント生成時に一度だけ名前から解決され、以後は変更されない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardExclusions {
    boards: Vec<Board>,
}

impl BoardExclusions {
    pub fn none() -> Self {
        Self::default()
    }

    /// 設定された名前をボード一覧から解決する。解決できない名前が1つでもあればエラー
    pub fn resolve<S: AsRef<str>>(names: &[S], boards: &[Board]) -> Result<Self> {
        let mut resolved = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            match boards.iter().find(|b| b.name == name) {
                Some(board) => resolved.push(board.clone()),
                None => {
                    warn!(board = name, "excluded board not found");
                    return Err(Error::UnknownBoard(name.to_string()));
                }
            }
        }

        Ok(Self { boards: resolved })
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn ids(&self) -> Vec<i64> {
        self.boards.iter().map(|b| b.id).collect()
    }

    pub fn contains(&self, board_id: i64) -> bool {
        self.boards.iter().any(|b| b.id == board_id)
    }

    /// `(C) AND Board/ID != a AND Board/ID != b ...` に書き換える
    pub fn apply(&self, condition: &str) -> String {
        if self.boards.is_empty() {
            return condition.to_string();
        }

        let mut wrapped = format!("({})", condition);
        for board in &self.boards {
            wrapped.push_str(" AND ");
            wrapped.push_str(&Predicate::NotBoard(board.id).to_string());
        }
        wrapped
    }
}
