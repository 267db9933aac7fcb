//! Screen registry and run loop
//!
//! Screens are registered once at startup under a route name. Each route keeps
//! its own [`State`] across runs; the loop runs the current screen over and
//! over and follows the [`Transition`] it returns.

use thiserror::Error;
use tracing::{info, warn};

use crate::context::Minitel;
use crate::input::ReadError;
use crate::protocol::FunctionKey;
use crate::state::State;
use crate::transport::TransportError;

/// What to do after a screen run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Run the same screen again
    Stay,
    Goto(String),
    Quit,
}

impl Transition {
    pub fn goto(route: impl Into<String>) -> Self {
        Transition::Goto(route.into())
    }
}

/// Screen logic
pub trait Screen {
    /// Route name
    fn name(&self) -> &'static str;

    /// State the route starts with
    fn initial_state(&self) -> State {
        State::new()
    }

    fn run(&self, ctx: &mut Minitel, state: &mut State) -> anyhow::Result<Transition>;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouterError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),
}

struct Route {
    screen: Box<dyn Screen>,
    state: State,
}

/// Static screen registry
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    current: Option<usize>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a screen. The first one registered is current until `goto`.
    pub fn register(mut self, screen: impl Screen + 'static) -> Self {
        let state = screen.initial_state();
        self.routes.push(Route {
            screen: Box::new(screen),
            state,
        });
        if self.current.is_none() {
            self.current = Some(0);
        }
        self
    }

    pub fn goto(&mut self, name: &str) -> Result<(), RouterError> {
        let index = self
            .routes
            .iter()
            .position(|r| r.screen.name() == name)
            .ok_or_else(|| RouterError::UnknownRoute(name.to_string()))?;
        self.current = Some(index);
        Ok(())
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current.map(|i| self.routes[i].screen.name())
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&'static str> {
        self.routes.iter().map(|r| r.screen.name()).collect()
    }

    /// State of a route
    #[cfg(test)]
    pub fn state(&self, name: &str) -> Option<&State> {
        self.routes
            .iter()
            .find(|r| r.screen.name() == name)
            .map(|r| &r.state)
    }

    /// Run the current screen once, then flush its output.
    pub fn run_current(&mut self, ctx: &mut Minitel) -> anyhow::Result<Transition> {
        let index = self
            .current
            .ok_or_else(|| RouterError::UnknownRoute(String::new()))?;
        let route = &mut self.routes[index];
        let result = route.screen.run(ctx, &mut route.state);
        ctx.flush()?;
        result
    }

    /// Run screens until one quits or the link closes.
    ///
    /// A Sommaire abort that escapes a screen returns to `start`; any other
    /// navigation abort reruns the current screen.
    pub fn run(&mut self, ctx: &mut Minitel, start: &str) -> anyhow::Result<()> {
        self.goto(start)?;
        info!("Minitel loop started on {} ({})", start, ctx.transport_name());
        ctx.out().clear_screen();
        ctx.flush()?;

        loop {
            match self.run_current(ctx) {
                Ok(Transition::Stay) => {}
                Ok(Transition::Goto(route)) => {
                    info!("Route: {}", route);
                    self.goto(&route)?;
                }
                Ok(Transition::Quit) => {
                    info!("Screen requested quit");
                    return Ok(());
                }
                Err(e) => match navigation_key(&e) {
                    Some(FunctionKey::Sommaire) => {
                        info!("SOMMAIRE: back to {}", start);
                        self.goto(start)?;
                    }
                    Some(key) => {
                        warn!("Unhandled navigation key {} on {:?}", key, self.current_name());
                    }
                    None if is_closed(&e) => {
                        info!("Terminal link closed");
                        return Ok(());
                    }
                    None => return Err(e),
                },
            }
        }
    }
}

fn navigation_key(error: &anyhow::Error) -> Option<FunctionKey> {
    error
        .downcast_ref::<ReadError>()
        .and_then(ReadError::navigation_key)
}

fn is_closed(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<TransportError>(),
        Some(TransportError::Closed)
    ) || matches!(
        error.downcast_ref::<ReadError>(),
        Some(ReadError::Transport(TransportError::Closed))
    )
}
