//! Core error taxonomy.
//!
//! The transport layer maps [`CoreError::kind`] onto HTTP status codes or
//! socket `error` frames; reducers and room operations never mutate state
//! before returning an error.

use thiserror::Error;

/// Coarse error category, independent of the concrete error type.
///
/// This is the taxonomy the transport switches on — not every `CoreError`
/// variant needs its own HTTP status, but every one needs a kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Forbidden,
    Conflict,
    TooManyRequests,
    Unauthorized,
    Internal,
}

/// Errors raised by room lifecycle operations.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RoomError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room code already in use")]
    CodeCollision,
    #[error("room is full")]
    RoomFull,
    #[error("user has been kicked from this room")]
    UserKicked,
    #[error("room is private")]
    PrivateRoom,
    #[error("only the leader can do that")]
    NotLeader,
    #[error("user is not a member of this room")]
    NotAMember,
    #[error("not every player is ready")]
    NotAllReady,
    #[error("duplicate user id in team assignment")]
    DuplicateTeamSlot,
    #[error("team assignment references a non-member")]
    UnknownTeamMember,
    #[error("team assignment is incomplete")]
    IncompleteTeams,
    #[error("a game is already in progress")]
    GameAlreadyInProgress,
    #[error("no game is in progress")]
    GameNotInProgress,
    #[error("too many join requests, try again in {retry_after_secs}s")]
    TooManyJoinRequests { retry_after_secs: u64 },
    #[error("no join request from this user")]
    JoinRequestNotFound,
}

/// Errors raised by connection tracking.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConnectionError {
    #[error("room not found")]
    RoomNotFound,
    #[error("user has been kicked from this room")]
    UserKicked,
}

/// Errors raised inside a game reducer.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum GameError {
    #[error("it isn't your turn")]
    OutOfTurn,
    #[error("that action isn't legal in the current phase")]
    WrongPhase,
    #[error("you are disconnected")]
    Disconnected,
    #[error("you already acted this turn")]
    AlreadyActed,
    #[error("illegal bid: {0}")]
    IllegalBid(String),
    #[error("illegal play: {0}")]
    IllegalPlay(String),
    #[error("card not in hand")]
    CardNotInHand,
    #[error("tile not in hand")]
    TileNotInHand,
    #[error("unknown player")]
    UnknownPlayer,
}

/// Top-level error type returned from room/game operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Coarse category used by the transport layer to pick a status code.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Room(e) => match e {
                RoomError::RoomNotFound => ErrorKind::NotFound,
                RoomError::CodeCollision | RoomError::GameAlreadyInProgress => {
                    ErrorKind::Conflict
                }
                RoomError::RoomFull
                | RoomError::NotAllReady
                | RoomError::DuplicateTeamSlot
                | RoomError::UnknownTeamMember
                | RoomError::IncompleteTeams
                | RoomError::GameNotInProgress
                | RoomError::JoinRequestNotFound => ErrorKind::BadRequest,
                RoomError::UserKicked | RoomError::PrivateRoom | RoomError::NotLeader => {
                    ErrorKind::Forbidden
                }
                RoomError::NotAMember => ErrorKind::Forbidden,
                RoomError::TooManyJoinRequests { .. } => ErrorKind::TooManyRequests,
            },
            Self::Connection(e) => match e {
                ConnectionError::RoomNotFound => ErrorKind::NotFound,
                ConnectionError::UserKicked => ErrorKind::Forbidden,
            },
            Self::Game(_) => ErrorKind::BadRequest,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Machine-readable code for errors the client needs to branch on.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Room(RoomError::PrivateRoom) => Some("PRIVATE_ROOM"),
            Self::Room(RoomError::UserKicked) | Self::Connection(ConnectionError::UserKicked) => {
                Some("KICKED")
            }
            Self::Room(RoomError::TooManyJoinRequests { .. }) => Some("RATE_LIMITED"),
            _ => None,
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
