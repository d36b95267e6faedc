//! 監査操作の楽観的更新
//!
//! 行IDごとに `Idle → Pending → {Confirmed | RolledBack}` を管理する。
//! Pending の間は同じ行への監査を受け付けないので、連打しても送信は1回。

use crate::error::{Error, Result};
use crate::types::{AuditAck, AuditPayload, DisplayRow, RowId};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};

/// 行ごとの監査状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditState {
    #[default]
    Idle,
    Pending,
    Confirmed,
    RolledBack,
}

/// 楽観的更新前の値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    audit_status: bool,
    audit_date: Option<NaiveDate>,
}

impl Snapshot {
    fn capture(row: &DisplayRow) -> Self {
        Self {
            audit_status: row.audit_status,
            audit_date: row.audit_date,
        }
    }

    fn restore(&self, row: &mut DisplayRow) {
        row.audit_status = self.audit_status;
        row.audit_date = self.audit_date;
    }
}

#[derive(Debug, Clone)]
enum Tracked {
    Pending { snapshot: Snapshot, audited_on: NaiveDate },
    Confirmed,
    RolledBack,
}

/// 送信すべき監査
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRequest {
    pub id: RowId,
    pub payload: AuditPayload,
}

#[derive(Debug, Clone, Default)]
pub struct AuditCoordinator {
    tracked: HashMap<RowId, Tracked>,
}

impl AuditCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: RowId) -> AuditState {
        match self.tracked.get(&id) {
            None => AuditState::Idle,
            Some(Tracked::Pending { .. }) => AuditState::Pending,
            Some(Tracked::Confirmed) => AuditState::Confirmed,
            Some(Tracked::RolledBack) => AuditState::RolledBack,
        }
    }

    pub fn is_pending(&self, id: RowId) -> bool {
        self.state(id) == AuditState::Pending
    }

    pub fn pending_ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self
            .tracked
            .iter()
            .filter(|(_, t)| matches!(t, Tracked::Pending { .. }))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// 監査開始: 行をその場で書き換え、送信内容を返す
    pub fn begin(
        &mut self,
        rows: &mut [DisplayRow],
        id: RowId,
        now: DateTime<Utc>,
    ) -> Result<AuditRequest> {
        if self.is_pending(id) {
            tracing::debug!(id, "audit already pending, ignored");
            return Err(Error::AuditPending(id));
        }

        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::UnknownRow(id))?;

        let audited_on = now.date_naive();
        let snapshot = Snapshot::capture(row);
        row.audit_status = true;
        row.audit_date = Some(audited_on);

        self.tracked.insert(
            id,
            Tracked::Pending {
                snapshot,
                audited_on,
            },
        );

        Ok(AuditRequest {
            id,
            payload: AuditPayload {
                audit_status: true,
                last_audit: now,
            },
        })
    }

    /// 送信結果の反映
    ///
    /// 失敗時は行を更新前の値に戻し、`MutationFailure` を返す。
    pub fn settle(
        &mut self,
        rows: &mut [DisplayRow],
        id: RowId,
        outcome: Result<AuditAck>,
    ) -> Result<AuditState> {
        let snapshot = match self.tracked.get(&id) {
            Some(Tracked::Pending { snapshot, .. }) => *snapshot,
            _ => {
                tracing::warn!(id, "audit result without pending mutation ignored");
                return Ok(self.state(id));
            }
        };

        match outcome {
            Ok(_) => {
                self.tracked.insert(id, Tracked::Confirmed);
                Ok(AuditState::Confirmed)
            }
            Err(e) => {
                if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
                    snapshot.restore(row);
                }
                self.tracked.insert(id, Tracked::RolledBack);

                let error = match e {
                    Error::MutationFailure { .. } => e,
                    other => Error::MutationFailure {
                        id,
                        reason: other.to_string(),
                    },
                };
                tracing::error!(id, error = %error, "audit rolled back");
                Err(error)
            }
        }
    }

    /// 行の再構築後、送信中の監査を新しい行に掛け直す
    ///
    /// 新しい行の値がロールバック先になる。行が消えた確定済みの状態は捨てる。
    pub fn reapply_pending(&mut self, rows: &mut [DisplayRow]) {
        let ids: HashSet<RowId> = rows.iter().map(|r| r.id).collect();
        self.tracked
            .retain(|id, t| matches!(t, Tracked::Pending { .. }) || ids.contains(id));

        for row in rows.iter_mut() {
            if let Some(Tracked::Pending {
                snapshot,
                audited_on,
            }) = self.tracked.get_mut(&row.id)
            {
                *snapshot = Snapshot::capture(row);
                row.audit_status = true;
                row.audit_date = Some(*audited_on);
            }
        }
    }
}
