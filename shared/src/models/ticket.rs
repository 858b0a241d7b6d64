//! Ticket models: detail status machines and the parent-status cascade

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A detail-level status with an explicit transition table.
///
/// Each ticket family supplies its own table; the validation and
/// aggregation machinery is shared. A terminal status has an empty
/// transition set and rejects all further transitions.
pub trait DetailStatus: Copy + Eq + Sized + 'static {
    /// Status assigned to every newly created detail.
    const INITIAL: Self;

    /// Statuses this one may transition to.
    fn allowed_transitions(self) -> &'static [Self];

    /// Whether this status represents cancellation.
    fn is_cancelled(self) -> bool;

    fn as_str(self) -> &'static str;

    fn parse(s: &str) -> Option<Self>;

    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Terminal without being cancelled: the detail finished its lifecycle.
    fn is_terminal_success(self) -> bool {
        self.is_terminal() && !self.is_cancelled()
    }

    fn can_transition_to(self, next: Self) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// Production ticket detail lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionDetailStatus {
    New,
    Approval,
    Complete,
    Ready,
    Closed,
    Cancelled,
}

impl DetailStatus for ProductionDetailStatus {
    const INITIAL: Self = ProductionDetailStatus::New;

    fn allowed_transitions(self) -> &'static [Self] {
        use ProductionDetailStatus::*;
        match self {
            New => &[Approval, Cancelled],
            Approval => &[Complete, Cancelled],
            Complete => &[Ready],
            Ready => &[Closed],
            Closed | Cancelled => &[],
        }
    }

    fn is_cancelled(self) -> bool {
        self == ProductionDetailStatus::Cancelled
    }

    fn as_str(self) -> &'static str {
        match self {
            ProductionDetailStatus::New => "new",
            ProductionDetailStatus::Approval => "approval",
            ProductionDetailStatus::Complete => "complete",
            ProductionDetailStatus::Ready => "ready",
            ProductionDetailStatus::Closed => "closed",
            ProductionDetailStatus::Cancelled => "cancelled",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ProductionDetailStatus::New),
            "approval" => Some(ProductionDetailStatus::Approval),
            "complete" => Some(ProductionDetailStatus::Complete),
            "ready" => Some(ProductionDetailStatus::Ready),
            "closed" => Some(ProductionDetailStatus::Closed),
            "cancelled" => Some(ProductionDetailStatus::Cancelled),
            _ => None,
        }
    }
}

/// Purchasing ticket detail lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchasingDetailStatus {
    New,
    Approval,
    Successful,
    Shipping,
    Ready,
    Closed,
    Cancelled,
}

impl DetailStatus for PurchasingDetailStatus {
    const INITIAL: Self = PurchasingDetailStatus::New;

    fn allowed_transitions(self) -> &'static [Self] {
        use PurchasingDetailStatus::*;
        match self {
            New => &[Approval, Cancelled],
            Approval => &[Successful, Cancelled],
            Successful => &[Shipping],
            Shipping => &[Ready],
            Ready => &[Closed],
            Closed | Cancelled => &[],
        }
    }

    fn is_cancelled(self) -> bool {
        self == PurchasingDetailStatus::Cancelled
    }

    fn as_str(self) -> &'static str {
        match self {
            PurchasingDetailStatus::New => "new",
            PurchasingDetailStatus::Approval => "approval",
            PurchasingDetailStatus::Successful => "successful",
            PurchasingDetailStatus::Shipping => "shipping",
            PurchasingDetailStatus::Ready => "ready",
            PurchasingDetailStatus::Closed => "closed",
            PurchasingDetailStatus::Cancelled => "cancelled",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(PurchasingDetailStatus::New),
            "approval" => Some(PurchasingDetailStatus::Approval),
            "successful" => Some(PurchasingDetailStatus::Successful),
            "shipping" => Some(PurchasingDetailStatus::Shipping),
            "ready" => Some(PurchasingDetailStatus::Ready),
            "closed" => Some(PurchasingDetailStatus::Closed),
            "cancelled" => Some(PurchasingDetailStatus::Cancelled),
            _ => None,
        }
    }
}

/// Sale order line lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleOrderStatus {
    New,
    Allocated,
    Packed,
    Shipped,
    Done,
    Cancelled,
}

impl DetailStatus for SaleOrderStatus {
    const INITIAL: Self = SaleOrderStatus::New;

    fn allowed_transitions(self) -> &'static [Self] {
        use SaleOrderStatus::*;
        match self {
            New => &[Allocated, Cancelled],
            Allocated => &[Packed, Cancelled],
            Packed => &[Shipped],
            Shipped => &[Done],
            Done | Cancelled => &[],
        }
    }

    fn is_cancelled(self) -> bool {
        self == SaleOrderStatus::Cancelled
    }

    fn as_str(self) -> &'static str {
        match self {
            SaleOrderStatus::New => "new",
            SaleOrderStatus::Allocated => "allocated",
            SaleOrderStatus::Packed => "packed",
            SaleOrderStatus::Shipped => "shipped",
            SaleOrderStatus::Done => "done",
            SaleOrderStatus::Cancelled => "cancelled",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(SaleOrderStatus::New),
            "allocated" => Some(SaleOrderStatus::Allocated),
            "packed" => Some(SaleOrderStatus::Packed),
            "shipped" => Some(SaleOrderStatus::Shipped),
            "done" => Some(SaleOrderStatus::Done),
            "cancelled" => Some(SaleOrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Ticket-level status, always derived from the detail statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    InProgress,
    PartialComplete,
    PartialCancelled,
    Complete,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::PartialComplete => "partial_complete",
            TicketStatus::PartialCancelled => "partial_cancelled",
            TicketStatus::Complete => "complete",
            TicketStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(TicketStatus::New),
            "in_progress" => Some(TicketStatus::InProgress),
            "partial_complete" => Some(TicketStatus::PartialComplete),
            "partial_cancelled" => Some(TicketStatus::PartialCancelled),
            "complete" => Some(TicketStatus::Complete),
            "cancelled" => Some(TicketStatus::Cancelled),
            _ => None,
        }
    }
}

/// Derive a ticket's status from the statuses of its details.
///
/// Priority order: all cancelled; all finished; cancelled + finished only;
/// some finished and none cancelled; all still new; otherwise in progress.
pub fn derive_parent_status<S: DetailStatus>(statuses: &[S]) -> TicketStatus {
    if statuses.is_empty() {
        return TicketStatus::New;
    }

    let total = statuses.len();
    let cancelled = statuses.iter().filter(|s| s.is_cancelled()).count();
    let finished = statuses.iter().filter(|s| s.is_terminal_success()).count();
    let fresh = statuses.iter().filter(|&&s| s == S::INITIAL).count();

    if cancelled == total {
        TicketStatus::Cancelled
    } else if finished == total {
        TicketStatus::Complete
    } else if cancelled > 0 && cancelled + finished == total {
        TicketStatus::PartialCancelled
    } else if finished > 0 && cancelled == 0 {
        TicketStatus::PartialComplete
    } else if fresh == total {
        TicketStatus::New
    } else {
        TicketStatus::InProgress
    }
}

/// A ticket header. The status field is the cascaded parent status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub status: String,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_by_role: String,
    pub updated_by: Option<Uuid>,
    pub updated_by_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ticket line item with an independently advanced status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDetail {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub variant_sku: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub status: String,
    pub expected_date: NaiveDate,
    pub completed_date: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ticket with all of its line items loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketWithDetails {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub details: Vec<TicketDetail>,
}

/// One entry in a detail's append-only status-change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusLogEntry {
    pub id: i64,
    pub detail_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub note: Option<String>,
    pub created_by: Uuid,
    pub created_by_role: String,
    pub created_at: DateTime<Utc>,
}

/// One requested line item in a bulk-create call.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketLineItemInput {
    pub variant_sku: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub expected_date: NaiveDate,
    pub note: Option<String>,
}

/// Input for creating a ticket with many line items in one request.
#[derive(Debug, Deserialize)]
pub struct BulkCreateTicketInput {
    pub name: String,
    pub line_items: Vec<TicketLineItemInput>,
}

/// Input for advancing a single detail's status.
#[derive(Debug, Deserialize)]
pub struct TransitionDetailInput {
    pub new_status: String,
    pub note: Option<String>,
}

/// Input for cancelling a ticket or a detail. A reason is required.
#[derive(Debug, Deserialize)]
pub struct CancelInput {
    pub reason: String,
}
