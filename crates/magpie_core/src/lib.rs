pub mod attacks;
pub mod bitboard;
pub mod movegen;
pub mod perft;
pub mod position;
pub mod types;
pub mod uci;
pub mod zobrist;

// Re-export the board model and move machinery; engine crates build on these.
pub use bitboard::Bitboard;
pub use movegen::legal_moves;
pub use perft::perft;
pub use position::{CastlingRights, FenError, KingMasks, Position, START_FEN};
pub use types::*;
pub use uci::{apply_uci_moves, move_to_uci, parse_uci_move};
pub use zobrist::ZOBRIST;
