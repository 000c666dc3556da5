//! The budget invitation table and the invitation lifecycle.

use rusqlite::{Connection, params};
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    Error,
    budget::BudgetRole,
    database_id::DatabaseId,
    user::{User, UserId, set_user_budget},
};

/// How long an invitation stays valid.
const INVITATION_VALIDITY: Duration = Duration::days(7);

/// The lifecycle state of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    /// The string stored in the database for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
        }
    }

    /// Parse a status stored in the database, falling back to expired for
    /// unrecognized values so a corrupted row can never be accepted.
    pub fn from_db_value(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            _ => Self::Expired,
        }
    }
}

/// An invitation for a user to join a shared budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetInvitation {
    /// The id for the invitation.
    pub id: DatabaseId,
    /// The budget the invitee would join.
    pub budget_id: DatabaseId,
    /// The member that sent the invitation.
    pub inviter_id: UserId,
    /// The email the invitation is addressed to.
    pub invitee_email: String,
    /// The role the invitee would join with.
    pub invited_role: BudgetRole,
    /// The unguessable token used to accept or decline.
    pub token: String,
    /// The lifecycle state of the invitation.
    pub status: InvitationStatus,
    /// When the invitation stops being acceptable.
    pub expires_at: OffsetDateTime,
    /// When the invitation was sent.
    pub created_at: OffsetDateTime,
    /// When the invitation was accepted, if it was.
    pub accepted_at: Option<OffsetDateTime>,
}

pub fn create_invitation_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget_invitation (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER NOT NULL REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
            inviter_id INTEGER NOT NULL REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            invitee_email TEXT NOT NULL,
            invited_role TEXT NOT NULL DEFAULT 'read_write',
            token TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'pending',
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            accepted_at TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_invitation(row: &rusqlite::Row) -> Result<BudgetInvitation, rusqlite::Error> {
    let raw_role: String = row.get(4)?;
    let raw_status: String = row.get(6)?;

    Ok(BudgetInvitation {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        inviter_id: UserId::new(row.get(2)?),
        invitee_email: row.get(3)?,
        invited_role: BudgetRole::from_db_value(&raw_role),
        token: row.get(5)?,
        status: InvitationStatus::from_db_value(&raw_status),
        expires_at: row.get(7)?,
        created_at: row.get(8)?,
        accepted_at: row.get(9)?,
    })
}

const INVITATION_COLUMNS: &str = "id, budget_id, inviter_id, invitee_email, invited_role, \
    token, status, expires_at, created_at, accepted_at";

/// Create an invitation for `invitee_email` to join `budget_id`.
///
/// # Errors
/// Returns:
/// - [Error::DuplicateInvitation] if a pending invitation for the email
///   already exists on this budget.
/// - [Error::AlreadyMember] if a user with the email is already a member.
/// - [Error::SqlError] for SQL errors.
pub fn create_invitation(
    budget_id: DatabaseId,
    inviter_id: UserId,
    invitee_email: &str,
    invited_role: BudgetRole,
    connection: &Connection,
) -> Result<BudgetInvitation, Error> {
    let has_pending: bool = connection.query_one(
        "SELECT EXISTS(SELECT 1 FROM budget_invitation
            WHERE budget_id = ?1 AND invitee_email = ?2 AND status = 'pending')",
        params![budget_id, invitee_email],
        |row| row.get(0),
    )?;
    if has_pending {
        return Err(Error::DuplicateInvitation);
    }

    let is_member: bool = connection.query_one(
        "SELECT EXISTS(SELECT 1 FROM user WHERE email = ?1 AND budget_id = ?2)",
        params![invitee_email, budget_id],
        |row| row.get(0),
    )?;
    if is_member {
        return Err(Error::AlreadyMember);
    }

    let token = Uuid::new_v4().simple().to_string();
    let created_at = OffsetDateTime::now_utc();
    let expires_at = created_at + INVITATION_VALIDITY;

    connection.execute(
        "INSERT INTO budget_invitation
            (budget_id, inviter_id, invitee_email, invited_role, token, status, expires_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7)",
        params![
            budget_id,
            inviter_id.as_i64(),
            invitee_email,
            invited_role.as_str(),
            token,
            expires_at,
            created_at,
        ],
    )?;

    Ok(BudgetInvitation {
        id: connection.last_insert_rowid(),
        budget_id,
        inviter_id,
        invitee_email: invitee_email.to_owned(),
        invited_role,
        token,
        status: InvitationStatus::Pending,
        expires_at,
        created_at,
        accepted_at: None,
    })
}

/// Get the pending invitations addressed to `email`.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_pending_invitations_for_email(
    email: &str,
    connection: &Connection,
) -> Result<Vec<BudgetInvitation>, Error> {
    connection
        .prepare(&format!(
            "SELECT {INVITATION_COLUMNS} FROM budget_invitation
            WHERE invitee_email = ?1 AND status = 'pending' ORDER BY created_at DESC"
        ))?
        .query_map(params![email], map_row_to_invitation)?
        .map(|invitation_result| invitation_result.map_err(Error::SqlError))
        .collect()
}

/// Get the invitation with the token `token`.
///
/// # Errors
/// Returns [Error::NotFound] if the token matches no invitation, or
/// [Error::SqlError] for other SQL errors.
pub fn get_invitation_by_token(
    token: &str,
    connection: &Connection,
) -> Result<BudgetInvitation, Error> {
    connection
        .query_one(
            &format!("SELECT {INVITATION_COLUMNS} FROM budget_invitation WHERE token = ?1"),
            params![token],
            map_row_to_invitation,
        )
        .map_err(|error| error.into())
}

/// Check that `invitation` can still be acted on by `user`.
fn check_invitation_actionable(invitation: &BudgetInvitation, user: &User) -> Result<(), Error> {
    if invitation.status != InvitationStatus::Pending {
        return Err(Error::InvitationProcessed);
    }

    if user.email != invitation.invitee_email {
        return Err(Error::InvitationEmailMismatch);
    }

    Ok(())
}

/// Accept the invitation with the token `token` as `user`.
///
/// On success the user joins the invitation's budget with the invited role
/// and the invitation is stamped accepted.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the token matches no invitation.
/// - [Error::InvitationProcessed] if it was already accepted or declined.
/// - [Error::InvitationExpired] if its expiry date has passed.
/// - [Error::InvitationEmailMismatch] if it is addressed to someone else.
/// - [Error::SqlError] for SQL errors.
pub fn accept_invitation(token: &str, user: &User, connection: &Connection) -> Result<(), Error> {
    let invitation = get_invitation_by_token(token, connection)?;

    check_invitation_actionable(&invitation, user)?;

    if OffsetDateTime::now_utc() > invitation.expires_at {
        return Err(Error::InvitationExpired);
    }

    let sql_transaction = connection.unchecked_transaction()?;

    set_user_budget(
        user.id,
        Some(invitation.budget_id),
        invitation.invited_role,
        &sql_transaction,
    )?;
    sql_transaction.execute(
        "UPDATE budget_invitation SET status = 'accepted', accepted_at = ?1 WHERE id = ?2",
        params![OffsetDateTime::now_utc(), invitation.id],
    )?;

    sql_transaction.commit()?;

    Ok(())
}

/// Decline the invitation with the token `token` as `user`.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the token matches no invitation.
/// - [Error::InvitationProcessed] if it was already accepted or declined.
/// - [Error::InvitationEmailMismatch] if it is addressed to someone else.
/// - [Error::SqlError] for SQL errors.
pub fn decline_invitation(token: &str, user: &User, connection: &Connection) -> Result<(), Error> {
    let invitation = get_invitation_by_token(token, connection)?;

    check_invitation_actionable(&invitation, user)?;

    connection.execute(
        "UPDATE budget_invitation SET status = 'declined' WHERE id = ?1",
        params![invitation.id],
    )?;

    Ok(())
}
