//! 工单生命周期状态机
//!
//! 一个按状态类型参数化的通用引擎，配三份声明式定义：
//! - 诉求工单（Request）
//! - 服务报修（ServiceReport）
//! - 社区服务订单（MskOrder）
//!
//! 引擎只做纯校验并返回迁移副作用，不触达存储；调用方拿到
//! [`Transition`] 后把状态与副作用写回工单记录。

mod kinds;

pub use kinds::{MSK_ORDER, REQUEST, SERVICE_REPORT};

use std::fmt::Display;

/// 迁移校验失败原因。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// 目标状态不在当前状态的迁移表中；携带两端状态便于诊断。
    #[error("cannot transition from \"{from}\" to \"{to}\"")]
    InvalidTransition { from: String, to: String },
    #[error("rejection reason required")]
    MissingReason,
    #[error("only tickets in the initial status can be edited")]
    NotEditable,
}

/// 管理侧迁移的管理员记录规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignRule<S: 'static> {
    /// 进入指定状态时记录操作管理员。
    OnEnter(S),
    /// 任何管理侧迁移都记录操作管理员。
    OnAnyTransition,
}

/// 用户确认子迁移：仅允许从 `from` 出发，由工单归属用户发起。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation<S: 'static> {
    pub from: S,
    pub accepted: S,
    pub declined: S,
}

/// 某一工单类型的完整生命周期定义。
#[derive(Debug)]
pub struct Lifecycle<S: 'static> {
    /// 创建时的初始状态，也是唯一允许内容编辑的状态。
    pub initial: S,
    /// 管理侧迁移表：(当前状态, 允许的目标集合)。表中缺失的
    /// 当前状态没有任何管理侧出口。
    pub admin_transitions: &'static [(S, &'static [S])],
    /// 进入该状态必须附带非空（去空白后）理由。
    pub rejected: S,
    /// 用户主动取消后的状态。
    pub cancelled: S,
    /// 用户不可再取消的状态集合。
    pub non_cancellable: &'static [S],
    pub assign_rule: AssignRule<S>,
    pub confirmation: Option<Confirmation<S>>,
}

/// 一次通过校验的管理侧迁移及其副作用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub to: S,
    /// 是否把操作管理员记到工单上。
    pub assign_admin: bool,
}

impl<S: Copy + Eq + Display> Lifecycle<S> {
    /// 当前状态允许的管理侧目标集合。
    pub fn admin_targets(&self, from: S) -> &'static [S] {
        self.admin_transitions
            .iter()
            .find(|(state, _)| *state == from)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    /// 校验管理侧状态迁移。
    ///
    /// 先查迁移表，再查拒绝理由；通过后按 [`AssignRule`] 给出
    /// 是否记录操作管理员。
    pub fn admin_transition(
        &self,
        from: S,
        to: S,
        reason: Option<&str>,
    ) -> Result<Transition<S>, LifecycleError> {
        if !self.admin_targets(from).contains(&to) {
            return Err(self.invalid(from, to));
        }
        if to == self.rejected && reason.map(str::trim).unwrap_or("").is_empty() {
            return Err(LifecycleError::MissingReason);
        }
        let assign_admin = match self.assign_rule {
            AssignRule::OnEnter(state) => to == state,
            AssignRule::OnAnyTransition => true,
        };
        Ok(Transition { to, assign_admin })
    }

    /// 用户确认子迁移：confirmed 决定走接受分支还是退回分支。
    pub fn user_confirm(&self, from: S, confirmed: bool) -> Result<S, LifecycleError> {
        let Some(confirmation) = self.confirmation else {
            // 没有确认流程的类型：任何确认尝试都是非法迁移。
            return Err(self.invalid(from, self.initial));
        };
        if from != confirmation.from {
            let target = if confirmed {
                confirmation.accepted
            } else {
                confirmation.declined
            };
            return Err(self.invalid(from, target));
        }
        Ok(if confirmed {
            confirmation.accepted
        } else {
            confirmation.declined
        })
    }

    /// 用户主动取消：仅当当前状态不在不可取消集合中。
    pub fn user_cancel(&self, from: S) -> Result<S, LifecycleError> {
        if self.non_cancellable.contains(&from) {
            return Err(self.invalid(from, self.cancelled));
        }
        Ok(self.cancelled)
    }

    /// 内容编辑门卫：仅初始状态允许编辑描述/联系字段。
    pub fn ensure_editable(&self, status: S) -> Result<(), LifecycleError> {
        if status != self.initial {
            return Err(LifecycleError::NotEditable);
        }
        Ok(())
    }

    fn invalid(&self, from: S, to: S) -> LifecycleError {
        LifecycleError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
