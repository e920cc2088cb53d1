//! Navigation guards.
//!
//! A router holds at most one before-guard and one after-guard. Registering a guard replaces the
//! previous one.

use std::{cell::RefCell, future::Future, rc::Rc};

use futures_util::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::state::ActiveRoute;

/// What a before-guard decided.
pub enum GuardVerdict {
    /// Let the navigation continue.
    Proceed,
    /// Cancel the navigation. Nothing changes.
    Veto,
    /// Decide later. `false` cancels the navigation.
    Pending(LocalBoxFuture<'static, bool>),
}

impl GuardVerdict {
    /// Decide once `decision` completes.
    ///
    /// ```rust
    /// # use waypoint_router::prelude::*;
    /// let verdict = GuardVerdict::pending(async { true });
    /// assert!(futures::executor::block_on(verdict.resolve()));
    /// ```
    pub fn pending(decision: impl Future<Output = bool> + 'static) -> Self {
        Self::Pending(decision.boxed_local())
    }

    /// Wait for the decision. `true` means proceed.
    pub async fn resolve(self) -> bool {
        match self {
            Self::Proceed => true,
            Self::Veto => false,
            Self::Pending(decision) => decision.await,
        }
    }
}

impl std::fmt::Debug for GuardVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proceed => write!(f, "Proceed"),
            Self::Veto => write!(f, "Veto"),
            Self::Pending(_) => write!(f, "Pending"),
        }
    }
}

impl From<bool> for GuardVerdict {
    fn from(proceed: bool) -> Self {
        match proceed {
            true => Self::Proceed,
            false => Self::Veto,
        }
    }
}

impl From<()> for GuardVerdict {
    fn from(_: ()) -> Self {
        Self::Proceed
    }
}

/// [`None`] proceeds, only an explicit `false` vetoes.
impl From<Option<bool>> for GuardVerdict {
    fn from(proceed: Option<bool>) -> Self {
        proceed.unwrap_or(true).into()
    }
}

/// When an after-guard is done.
pub enum GuardCompletion {
    /// Done immediately.
    Done,
    /// Done when the future completes.
    Pending(LocalBoxFuture<'static, ()>),
}

impl GuardCompletion {
    /// Complete once `work` completes.
    pub fn pending(work: impl Future<Output = ()> + 'static) -> Self {
        Self::Pending(work.boxed_local())
    }

    /// Wait for completion.
    pub async fn resolve(self) {
        if let Self::Pending(work) = self {
            work.await;
        }
    }
}

impl From<()> for GuardCompletion {
    fn from(_: ()) -> Self {
        Self::Done
    }
}

/// The props of a transition, writable by the before-guard.
///
/// Whatever the slot holds once the before-guard has decided is committed with the route and
/// handed to the after-guard.
#[derive(Debug, Clone, Default)]
pub struct PropsSlot(Rc<RefCell<Option<Value>>>);

impl PropsSlot {
    pub(crate) fn new(props: Option<Value>) -> Self {
        Self(Rc::new(RefCell::new(props)))
    }

    /// Attach `props` to the transition, replacing the current ones.
    pub fn set(&self, props: impl Into<Value>) {
        *self.0.borrow_mut() = Some(props.into());
    }

    /// Remove the props from the transition.
    pub fn clear(&self) {
        *self.0.borrow_mut() = None;
    }

    /// The current props.
    pub fn get(&self) -> Option<Value> {
        self.0.borrow().clone()
    }
}

/// Runs before a route is committed and may cancel the navigation.
pub trait BeforeGuard<T> {
    /// Decide whether to navigate from `from` to `to`.
    fn before(&self, to: &ActiveRoute<T>, from: Option<&ActiveRoute<T>>, props: &PropsSlot) -> GuardVerdict;
}

impl<T, F, R> BeforeGuard<T> for F
where
    F: Fn(&ActiveRoute<T>, Option<&ActiveRoute<T>>, &PropsSlot) -> R,
    R: Into<GuardVerdict>,
{
    fn before(&self, to: &ActiveRoute<T>, from: Option<&ActiveRoute<T>>, props: &PropsSlot) -> GuardVerdict {
        self(to, from, props).into()
    }
}

/// Runs after a route was committed and written to history.
pub trait AfterGuard<T> {
    /// React to the navigation from `from` to `to`.
    fn after(&self, to: &ActiveRoute<T>, from: Option<&ActiveRoute<T>>, props: Option<&Value>) -> GuardCompletion;
}

impl<T, F, R> AfterGuard<T> for F
where
    F: Fn(&ActiveRoute<T>, Option<&ActiveRoute<T>>, Option<&Value>) -> R,
    R: Into<GuardCompletion>,
{
    fn after(&self, to: &ActiveRoute<T>, from: Option<&ActiveRoute<T>>, props: Option<&Value>) -> GuardCompletion {
        self(to, from, props).into()
    }
}

/// The registered guards.
pub(crate) struct GuardChain<T> {
    before: Option<Rc<dyn BeforeGuard<T>>>,
    after: Option<Rc<dyn AfterGuard<T>>>,
}

// manual impl required because derive macro requires default for T unnecessarily
impl<T> Default for GuardChain<T> {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
        }
    }
}

impl<T> GuardChain<T> {
    pub(crate) fn set_before(&mut self, guard: Rc<dyn BeforeGuard<T>>) {
        self.before = Some(guard);
    }

    pub(crate) fn set_after(&mut self, guard: Rc<dyn AfterGuard<T>>) {
        self.after = Some(guard);
    }

    /// The before-guard, detached from the chain so it may re-register guards while running.
    pub(crate) fn before(&self) -> Option<Rc<dyn BeforeGuard<T>>> {
        self.before.clone()
    }

    pub(crate) fn after(&self) -> Option<Rc<dyn AfterGuard<T>>> {
        self.after.clone()
    }
}
