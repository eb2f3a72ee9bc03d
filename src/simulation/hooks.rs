//! Training progress hooks
use crate::envs::CartPoleState;

/// Observes training progress.
///
/// All methods are called on the thread that drives training and have no effect on the
/// outcome. The default implementations do nothing.
pub trait TrainHook {
    /// Called when a training iteration starts.
    fn on_iteration_start(&mut self, _iteration: usize, _total_iterations: usize) {}

    /// Called when a game of the current batch finishes.
    ///
    /// Games may finish in any order.
    fn on_game_end(&mut self, _game: usize, _total_games: usize) {}

    /// Called with each state of the first game of a batch when observation is enabled,
    /// starting with the initial state.
    fn on_observe(&mut self, _state: &CartPoleState) {}
}

impl TrainHook for () {}

impl<T: TrainHook + ?Sized> TrainHook for &'_ mut T {
    fn on_iteration_start(&mut self, iteration: usize, total_iterations: usize) {
        T::on_iteration_start(self, iteration, total_iterations)
    }
    fn on_game_end(&mut self, game: usize, total_games: usize) {
        T::on_game_end(self, game, total_games)
    }
    fn on_observe(&mut self, state: &CartPoleState) {
        T::on_observe(self, state)
    }
}
