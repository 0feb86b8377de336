//! 基本型モジュール
//!
//! # 型の依存関係
//!
//! ```text
//! Side
//!   ↓
//! Square → SquareSet
//!   ↓
//! PieceKind
//!   ↓
//! Piece
//!   ↓
//! Hands
//! ```

mod hand;
mod piece;
mod side;
mod square;
mod square_set;

pub use hand::{Hands, MAX_HAND_PIECES};
pub use piece::{Piece, PieceKind};
pub use side::Side;
pub use square::Square;
pub use square_set::SquareSet;
