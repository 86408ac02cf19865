/// Game state machine; only the game logic task writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameState {
    Init,
    SelectMap,
    Ready,
    Playing,
    Paused,
    LostLife,
    Won,
    GameOver,
}

impl GameState {
    /// States that show the maze board.
    pub fn shows_maze(self) -> bool {
        matches!(
            self,
            GameState::Ready | GameState::Playing | GameState::LostLife
        )
    }

    /// End screens that wait for a button press.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Won | GameState::GameOver)
    }
}
