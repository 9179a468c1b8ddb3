//! sheetcrm entrypoint.

use sheetcrm::run;
use sheetcrm::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
