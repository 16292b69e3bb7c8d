use clap::Subcommand;
use countdown_core::{LaunchTracker, PersistedState, SqliteStore};

const AGREEMENT: &str = "\
User Agreement

Copyright (c) Countdown Fate Systems, LLC

IMPORTANT: PLEASE READ THIS LICENSE CAREFULLY BEFORE USING THIS SOFTWARE.

By downloading and using the Countdown app, you agree to the following terms and conditions.

Acceptance of Fate: The countdown timer presented is final and binding, and the App is not
liable for any consequences resulting from the time displayed.

Irrevocability: Once the countdown timer begins, it cannot be altered, reset, or stopped, and
attempts to tamper with it may result in undefined and irreversible consequences.

Forbidden Actions: You agree not to modify, reverse-engineer, or tamper with the App's code or
features, and you will not hold the developers liable for any outcomes related to the timer.

Limitation of Liability: The creators and developers of the App are not responsible for
emotional distress, physical harm, or unforeseen events caused by reliance on the countdown
timer.

Updates and Modifications: The developers reserve the right to update these terms and the
App's functionality at any time without prior notice, and continued use of the App constitutes
acceptance of such changes.

Legal Disclaimer: By downloading the App, you enter into this agreement willingly and accept
all potential risks associated with its use.
";

#[derive(Subcommand)]
pub enum TermsAction {
    /// Print the user agreement
    Show,
    /// Accept the user agreement
    Accept,
    /// Print whether the agreement has been accepted
    Status,
}

pub fn run(action: TermsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TermsAction::Show => print!("{AGREEMENT}"),
        TermsAction::Accept => {
            let mut state = PersistedState::new(SqliteStore::open()?);
            LaunchTracker::default().accept_terms(&mut state)?;
            println!("I have read the user agreement and accept the terms and conditions.");
        }
        TermsAction::Status => {
            let state = PersistedState::new(SqliteStore::open()?);
            println!("{}", state.has_accepted_terms()?);
        }
    }
    Ok(())
}
