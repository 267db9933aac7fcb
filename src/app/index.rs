//! Welcome page

use crate::context::Minitel;
use crate::protocol::Color;
use crate::router::{Screen, Transition};
use crate::state::State;

use super::USER_INPUT;

pub struct Index;

impl Screen for Index {
    fn name(&self) -> &'static str {
        "index"
    }

    fn initial_state(&self) -> State {
        [(USER_INPUT, "...")].into_iter().collect()
    }

    fn run(&self, ctx: &mut Minitel, state: &mut State) -> anyhow::Result<Transition> {
        let visits = ctx.store().get_int("loop").unwrap_or(0) + 1;
        ctx.store_mut().set("loop", visits);
        let last_global = ctx.store().get_str(USER_INPUT).unwrap_or_default().to_string();

        let out = ctx.out();
        out.clear_screen();
        out.scroll(false);
        out.position(3, 5);
        out.back_color(Color::Blue);
        out.print(&format!(" Bienvenue sur Minitel ! {} ", visits));
        out.back_color(Color::Black);

        if !last_global.is_empty() {
            out.position(7, 5);
            out.print_colored(&format!("Saisie globale : {}", last_global), Color::Green);
        }
        if let Some(last_local) = state.get_str(USER_INPUT) {
            out.position(9, 5);
            out.print_colored(&format!("Saisie de l'écran : {}", last_local), Color::Green);
        }

        out.position(5, 5);
        out.print_colored("Tapez quelque chose :", Color::Blue);
        let user_input = ctx.read_line(6, 5, 10)?;

        ctx.store_mut().set(USER_INPUT, user_input.as_str());
        state.set(USER_INPUT, user_input.as_str());
        ctx.out().bip();

        Ok(match user_input.trim().to_uppercase().as_str() {
            "DETAIL" => Transition::goto("detail"),
            "MENU" => Transition::goto("menu"),
            _ => Transition::Stay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;

    #[test]
    fn test_input_is_stored_and_routes() {
        let link = MemoryTransport::new();
        let mut ctx = Minitel::new(Box::new(link.clone()));
        let mut state = Index.initial_state();

        link.push_input(b"hello\r");
        assert_eq!(Index.run(&mut ctx, &mut state).unwrap(), Transition::Stay);
        assert_eq!(ctx.store().get_str(USER_INPUT), Some("hello"));
        assert_eq!(state.get_str(USER_INPUT), Some("hello"));

        link.push_input(b"DETAIL\x13\x41");
        assert_eq!(Index.run(&mut ctx, &mut state).unwrap(), Transition::goto("detail"));
        assert_eq!(ctx.store().get_int("loop"), Some(2));
    }
}
