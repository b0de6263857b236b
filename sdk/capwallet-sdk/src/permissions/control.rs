/// Result of a spend query: whether a route exists and how far it reaches.
///
/// Recurring values mirror the last fetched grant; window resets are never
/// simulated client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendController {
    pub is_allowed: bool,
    /// Spendable amount, `None` when uncapped
    pub amount: Option<u64>,
    pub window: Option<u64>,
    pub last_reset: Option<u64>,
    pub recurring_amount: Option<u64>,
}

impl SpendController {
    pub const fn not_allowed() -> Self {
        Self {
            is_allowed: false,
            amount: Some(0),
            window: None,
            last_reset: None,
            recurring_amount: None,
        }
    }

    pub const fn uncapped() -> Self {
        Self {
            is_allowed: true,
            amount: None,
            window: None,
            last_reset: None,
            recurring_amount: None,
        }
    }

    pub const fn once(amount: u64) -> Self {
        Self {
            is_allowed: true,
            amount: Some(amount),
            window: None,
            last_reset: None,
            recurring_amount: None,
        }
    }

    pub const fn recurring(
        current_amount: u64,
        recurring_amount: u64,
        window: u64,
        last_reset: u64,
    ) -> Self {
        Self {
            is_allowed: true,
            amount: Some(current_amount),
            window: Some(window),
            last_reset: Some(last_reset),
            recurring_amount: Some(recurring_amount),
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.window.is_some()
    }

    /// True when spending is allowed without any cap.
    pub fn can_spend_max(&self) -> bool {
        self.is_allowed && self.amount.is_none()
    }

    /// With no amount this only asks whether any route exists; use
    /// `can_spend_max` for the uncapped question.
    pub fn can_spend(&self, amount: Option<u64>) -> bool {
        if !self.is_allowed {
            return false;
        }
        match (self.amount, amount) {
            (Some(limit), Some(requested)) => requested <= limit,
            _ => true,
        }
    }

    /// Picks the widest of several alternative routes.
    pub(crate) fn widest(routes: impl IntoIterator<Item = SpendController>) -> Self {
        let mut widest: Option<SpendController> = None;
        for route in routes {
            if route.amount.is_none() {
                return route;
            }
            widest = match widest {
                Some(current) if current.amount >= route.amount => Some(current),
                _ => Some(route),
            };
        }
        widest.unwrap_or_else(Self::not_allowed)
    }
}
