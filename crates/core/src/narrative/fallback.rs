//! Hand-written roast used when the model is unavailable or misbehaves.

use super::{BattleCommentary, RoastRound};
use crate::scoring::{FighterSlot, Winner};

const DAMAGES: [u8; 6] = [65, 70, 75, 80, 85, 70];

/// Six fixed rounds with both names interpolated
pub fn fallback_commentary(name1: &str, name2: &str, winner: Winner) -> BattleCommentary {
    let lines: [(String, String); 6] = [
        (
            format!("Hey {name2}, I saw your resume. It reads like a buzzword bingo card that nobody won."),
            format!("{name2} forces an awkward smile."),
        ),
        (
            format!("That's rich coming from someone whose greatest achievement is being \"proficient in Microsoft Office.\" Welcome to the present, {name1}."),
            format!("{name1} clutches their chest dramatically."),
        ),
        (
            "At least I have achievements. Your profile says \"Thought Leader\" but your last post was a motivational quote from 2019.".to_string(),
            format!("{name2} nervously checks their phone."),
        ),
        (
            "You call yourself a tech expert but your GitHub has more forks than original code. Even your commits are copy-paste.".to_string(),
            format!("{name1} looks visibly shaken."),
        ),
        (
            "Bold words from someone who lists \"synergy\" as a skill. The only thing you've disrupted is the coffee machine at your coworking space.".to_string(),
            format!("The crowd goes wild. {name2} is stunned."),
        ),
        (
            "Nice try, but your career trajectory looks like a stock chart from 2008. At least my failures are in private repos.".to_string(),
            format!("{name1} takes a deep breath, knowing that one stung."),
        ),
    ];

    let rounds: Vec<RoastRound> = lines
        .into_iter()
        .zip(DAMAGES)
        .enumerate()
        .map(|(idx, ((roast, reaction), damage))| RoastRound {
            round_number: (idx + 1) as u8,
            attacker: if idx % 2 == 0 {
                FighterSlot::First
            } else {
                FighterSlot::Second
            },
            roast,
            damage,
            reaction,
        })
        .collect();

    let verdict = match winner {
        Winner::First | Winner::Second => {
            let name = if winner == Winner::First { name1 } else { name2 };
            format!(
                "It was a brutal exchange. Both fighters left it all on the stage, but {name} walked off with slightly more dignity. {name} takes the crown!"
            )
        }
        Winner::Draw => "It was a brutal exchange. Both fighters left it all on the stage and neither gave an inch. The judges call it a draw!".to_string(),
    };

    BattleCommentary {
        introduction: format!(
            "The microphone is live! {name1} versus {name2}: two professionals enter, only one leaves with their dignity intact!"
        ),
        rounds,
        verdict,
        winner,
    }
}
