use crate::context::Minitel;
use crate::router::{Screen, Transition};
use crate::state::State;

use super::USER_INPUT;

/// Route-local key holding the last comment
const COMMENT: &str = "comment";

pub struct Detail;

impl Screen for Detail {
    fn name(&self) -> &'static str {
        "detail"
    }

    fn run(&self, ctx: &mut Minitel, state: &mut State) -> anyhow::Result<Transition> {
        let run = state.get_int("run").unwrap_or(0) + 1;
        state.set("run", run);

        let out = ctx.out();
        out.clear_screen();
        out.home();
        out.print(&format!("Détail, passage {}", run));
        if let Some(comment) = state.get_str(COMMENT) {
            out.position(3, 1);
            out.print(&format!("Dernier commentaire : {}", comment));
        }
        out.position(5, 1);

        let comment = ctx.read_here("Commentaire")?;
        state.set(COMMENT, comment.as_str());
        ctx.store_mut().set(USER_INPUT, "");

        let out = ctx.out();
        out.position(7, 1);
        out.print("Retour à l'accueil ? (o/n) ");
        Ok(match ctx.read_key(b"on")?.as_str() {
            "o" => Transition::goto("index"),
            "n" => Transition::goto("menu"),
            _ => Transition::Stay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ReadError;
    use crate::transport::memory::MemoryTransport;

    fn setup() -> (Minitel, MemoryTransport, State) {
        let link = MemoryTransport::new();
        let ctx = Minitel::new(Box::new(link.clone()));
        (ctx, link, State::new())
    }

    #[test]
    fn test_comment_and_answer() {
        let (mut ctx, link, mut state) = setup();
        ctx.store_mut().set(USER_INPUT, "hello");

        link.push_input(b"bien\rxo");
        assert_eq!(Detail.run(&mut ctx, &mut state).unwrap(), Transition::goto("index"));
        assert_eq!(state.get_str(COMMENT), Some("bien"));
        assert_eq!(ctx.store().get_str(USER_INPUT), Some(""));

        link.push_input(b"\rn");
        assert_eq!(Detail.run(&mut ctx, &mut state).unwrap(), Transition::goto("menu"));
        assert_eq!(state.get_int("run"), Some(2));
        assert_eq!(state.get_str(COMMENT), Some(""));
    }

    #[test]
    fn test_envoi_on_question_stays() {
        let (mut ctx, link, mut state) = setup();
        link.push_input(b"\r\x13\x41");
        assert_eq!(Detail.run(&mut ctx, &mut state).unwrap(), Transition::Stay);
    }

    #[test]
    fn test_sommaire_during_comment() {
        let (mut ctx, link, mut state) = setup();
        link.push_input(b"abc\x13F");
        let err = Detail.run(&mut ctx, &mut state).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReadError>(),
            Some(ReadError::NavigationAbort(_))
        ));
        assert_eq!(state.get_str(COMMENT), None);
    }
}
