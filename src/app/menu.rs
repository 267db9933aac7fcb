//! Multiple-choice navigation page

use crate::context::Minitel;
use crate::input::mode::ChoiceInput;
use crate::input::{Choice, ReadError};
use crate::protocol::Color;
use crate::router::{Screen, Transition};
use crate::state::State;

/// Line used for error messages
const STATUS_LINE: u8 = 24;

pub struct Menu;

/// Route-local flag: answer with a single key instead of a typed line
const SINGLE_KEY: &str = "single_key";

impl Menu {
    fn options() -> Vec<Choice> {
        vec![
            Choice::new("index", "Retour à l'accueil"),
            Choice::new("detail", "Voir le détail"),
            Choice::new("keys", "Changer de mode de saisie"),
            Choice::new("quit", "Quitter"),
        ]
    }
}

impl Screen for Menu {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn run(&self, ctx: &mut Minitel, state: &mut State) -> anyhow::Result<Transition> {
        let single_key = state.get(SINGLE_KEY).and_then(|v| v.as_bool()).unwrap_or(false);
        let input = if single_key { ChoiceInput::Key } else { ChoiceInput::Free };

        let out = ctx.out();
        out.clear_screen();
        out.position(2, 1);
        out.underline(true);
        out.print("Menu");
        out.underline(false);
        if let Some(last) = state.get_str("last") {
            out.print(&format!(" (dernier choix : {})", last));
        }
        out.position(4, 1);

        let choice = match ctx.multiple_choice("Que voulez-vous faire ?", &Self::options(), input) {
            Ok(choice) => choice,
            Err(e @ ReadError::InvalidChoice { .. }) => {
                let out = ctx.out();
                out.delete_line(STATUS_LINE, 1);
                out.print_colored(&e.to_string(), Color::Red);
                out.print(" - une touche");
                out.bip();
                ctx.wait_for_key()?;
                return Ok(Transition::Stay);
            }
            Err(e) => return Err(e.into()),
        };
        state.set("last", choice.value.as_str());

        Ok(match choice.value.as_str() {
            "quit" => Transition::Quit,
            "index" | "detail" => Transition::goto(choice.value.clone()),
            "keys" => {
                state.set(SINGLE_KEY, !single_key);
                Transition::Stay
            }
            other => {
                let out = ctx.out();
                out.delete_line(STATUS_LINE, 1);
                out.flash(true);
                out.print(&format!("Choix inconnu : {}", other));
                out.flash(false);
                out.bip();
                Transition::Stay
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;

    fn run_with(state: &mut State, chunks: &[&[u8]]) -> anyhow::Result<Transition> {
        let link = MemoryTransport::new();
        let mut ctx = Minitel::new(Box::new(link.clone()));
        for chunk in chunks {
            link.push_input(chunk);
        }
        Menu.run(&mut ctx, state)
    }

    fn run(chunks: &[&[u8]]) -> (anyhow::Result<Transition>, State) {
        let mut state = State::new();
        (run_with(&mut state, chunks), state)
    }

    #[test]
    fn test_quick_index() {
        let (result, state) = run(&[b"2"]);
        assert_eq!(result.unwrap(), Transition::goto("detail"));
        assert_eq!(state.get_str("last"), Some("detail"));
    }

    #[test]
    fn test_quit() {
        let (result, _) = run(&[b"4"]);
        assert_eq!(result.unwrap(), Transition::Quit);
    }

    #[test]
    fn test_out_of_range_waits_for_key() {
        let (result, state) = run(&[b"7\r", b" "]);
        assert_eq!(result.unwrap(), Transition::Stay);
        assert!(state.get_str("last").is_none());
    }

    #[test]
    fn test_free_text_stays() {
        let (result, state) = run(&[b"aide\r"]);
        assert_eq!(result.unwrap(), Transition::Stay);
        assert_eq!(state.get_str("last"), Some("aide"));
    }

    #[test]
    fn test_single_key_mode() {
        let mut state = State::new();
        assert_eq!(run_with(&mut state, &[b"3"]).unwrap(), Transition::Stay);
        assert_eq!(state.get(SINGLE_KEY).and_then(|v| v.as_bool()), Some(true));

        // Letters are stray keys now; the read goes on until a valid index
        assert_eq!(run_with(&mut state, &[b"a1"]).unwrap(), Transition::goto("index"));
    }

    #[test]
    fn test_navigation_key_propagates() {
        let (result, _) = run(&[b"\x13F"]);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReadError>(),
            Some(ReadError::NavigationAbort(_))
        ));
    }
}
