//! A simple CLI tool for verifying a ballot ledger offline.
//! This replays the ledger with the server's own ballot implementation, and is
//! by definition compatible with the output of our API endpoints.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;

use ballot_backend::model::{
    api::{
        ballot::{CandidateDesc, Results},
        ledger::{LedgerDump, VoteEvent},
    },
    ledger::{Ledger, LedgerError},
};

const PROGRAM_NAME: &str = "ledger-cli";

const ABOUT_TEXT: &str = "Verify the integrity of a ballot ledger.

EXIT CODES:
     0: Verification succeeded.
   255: Ran successfully, but verification failed.
 Other: Error.";

const DUMP_PATH: &str = "DUMP_PATH";

const DUMP_PATH_HELP: &str = "The path to a JSON dump of the ledger,\n\
as returned by `GET /ledger/dump`";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME).about(ABOUT_TEXT).arg(
        Arg::new(DUMP_PATH)
            .help(DUMP_PATH_HELP)
            .action(ArgAction::Set)
            .required(true),
    )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON dump.
    Format(String),
    /// The ledger itself is corrupt or holds an invalid call.
    Ledger(LedgerError),
    /// The ledger is sound, but replaying it does not give the reported results.
    ResultsMismatch,
}

/// The outcome of a successful verification.
#[derive(Debug, Eq, PartialEq)]
struct Verified {
    results: Results,
    votes: Vec<VoteEvent>,
}

/// One line of the tally.
struct FriendlyResult<'a> {
    candidate: &'a CandidateDesc,
    percentage: f64,
}

impl Display for FriendlyResult<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let count = self.candidate.vote_count;
        write!(
            f,
            "{}: {} vote{} ({:.1}%)",
            self.candidate.name,
            count,
            if count != 1 { "s" } else { "" },
            self.percentage
        )
    }
}

/// Run verification.
fn verify(path: &str) -> Result<Verified, Error> {
    // Load the file.
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let dump: LedgerDump =
        serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;

    // Check the hash chain and re-execute every call.
    let ledger = Ledger::from_blocks(dump.blocks);
    let ballot = ledger.replay().map_err(Error::Ledger)?;

    // Compare against what the server claimed.
    let results = Results::from(&ballot);
    if results != dump.results {
        return Err(Error::ResultsMismatch);
    }

    let votes = ledger
        .vote_events(0)
        .map(|(block, event)| VoteEvent::new(block, event))
        .collect();

    Ok(Verified { results, votes })
}

/// Run the program and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let path: &String = args.get_one(DUMP_PATH).unwrap(); // Required argument is guaranteed to be present.

    match verify(path) {
        Ok(verified) => {
            println!("Verification succeeded.");
            let results = &verified.results;
            for candidate in &results.candidates {
                let line = FriendlyResult {
                    candidate,
                    percentage: results.percentage(candidate),
                };
                println!("{line}");
            }
            println!(
                "Winner: {}{}",
                results.winner.winner_name,
                if results.tie { " (tied, lowest index wins)" } else { "" }
            );
            println!("Voting blocks:");
            for vote in &verified.votes {
                println!(
                    "  #{} {} at {}: {}",
                    vote.event.block_number, vote.block_hash, vote.timestamp, vote.event.candidate_name
                );
            }
            0
        }
        Err(Error::IO(msg)) => {
            println!("IO Error: {msg}");
            1
        }
        Err(Error::Format(msg)) => {
            println!("Dump format error: {msg}");
            1
        }
        Err(Error::Ledger(err)) => {
            println!("Verification failed: {err}");
            255
        }
        Err(Error::ResultsMismatch) => {
            println!("Verification failed: the reported results do not match the ledger.");
            255
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ballot_backend::model::{
        address::Address,
        ballot::{Ballot, VoteCast},
        ledger::{Block, BlockHash, Call, Transaction},
    };

    use super::*;

    /// A finished ballot: Bob beats Alice two votes to one.
    fn example_dump() -> LedgerDump {
        let chair = Address::from_secret("cli chairperson");
        let voter1 = Address::from_secret("cli voter one");
        let voter2 = Address::from_secret("cli voter two");
        let candidates = vec!["Alice".to_string(), "Bob".to_string()];

        let mut ballot = Ballot::deploy(chair, candidates.clone()).unwrap();
        let mut ledger = Ledger::genesis(chair, candidates);
        let calls = [
            (chair, Call::GrantVotingRight { voter: voter1 }),
            (chair, Call::GrantVotingRight { voter: voter2 }),
            (voter1, Call::Vote { candidate: 1 }),
            (voter2, Call::Vote { candidate: 1 }),
            (chair, Call::Vote { candidate: 0 }),
        ];
        for (from, call) in calls {
            let events = call
                .apply(&mut ballot, &from, ledger.next_number())
                .unwrap();
            ledger.append(Transaction { from, call, events });
        }

        LedgerDump::new(&ballot, &ledger)
    }

    /// Write `contents` to a fresh file and return its path.
    fn write_file(name: &str, contents: &str) -> String {
        let path: PathBuf = std::env::temp_dir().join(format!(
            "{PROGRAM_NAME}-{}-{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn write_dump(name: &str, dump: &LedgerDump) -> String {
        write_file(name, &serde_json::to_string_pretty(dump).unwrap())
    }

    #[test]
    fn verification() {
        // This test actually enters backend code, so enable logging.
        log4rs_test_utils::test_logging::init_logging_once_for(["ballot_backend"], None, None);

        let dump = example_dump();
        let verified = verify(&write_dump("valid", &dump)).unwrap();
        assert_eq!(verified.results, dump.results);
        assert_eq!(verified.results.winner.winner_name, "Bob");
        assert_eq!(
            verified
                .votes
                .iter()
                .map(|v| v.event.block_number)
                .collect::<Vec<_>>(),
            vec![3, 4, 5]
        );

        let mut tampered = example_dump();
        tampered.blocks[3].transaction.call = Call::Vote { candidate: 0 };
        assert_eq!(
            verify(&write_dump("tampered", &tampered)),
            Err(Error::Ledger(LedgerError::BadHash(3)))
        );

        let mut inflated = example_dump();
        inflated.results.candidates[0].vote_count += 1;
        assert_eq!(
            verify(&write_dump("inflated", &inflated)),
            Err(Error::ResultsMismatch)
        );

        // A resealed genesis block claiming a vote.
        let chair = Address::from_secret("cli chairperson");
        let candidates = vec!["Alice".to_string(), "Bob".to_string()];
        let genesis = Block::new(0, BlockHash::default(), Transaction {
            from: chair,
            call: Call::Deploy {
                candidates: candidates.clone(),
            },
            events: vec![VoteCast {
                block_number: 0,
                candidate_name: "Bob".to_string(),
            }],
        });
        let phantom = LedgerDump {
            blocks: vec![genesis],
            results: Results::from(&Ballot::deploy(chair, candidates).unwrap()),
        };
        assert_eq!(
            verify(&write_dump("phantom", &phantom)),
            Err(Error::Ledger(LedgerError::EventMismatch(0)))
        );

        let mut truncated = example_dump();
        truncated.blocks.clear();
        assert_eq!(
            verify(&write_dump("truncated", &truncated)),
            Err(Error::Ledger(LedgerError::Empty))
        );
    }

    #[test]
    fn correct_cli_usage() {
        let valid = write_dump("cli-valid", &example_dump());
        let args = cli().try_get_matches_from([PROGRAM_NAME, valid.as_str()]).unwrap();
        assert_eq!(run(&args), 0);

        let mut inflated = example_dump();
        inflated.results.total_votes += 1;
        let inflated = write_dump("cli-inflated", &inflated);
        let args = cli().try_get_matches_from([PROGRAM_NAME, inflated.as_str()]).unwrap();
        assert_eq!(run(&args), 255);

        let malformed = write_file("cli-malformed", "{\"blocks\": 42}");
        let args = cli().try_get_matches_from([PROGRAM_NAME, malformed.as_str()]).unwrap();
        assert_eq!(run(&args), 1);

        let args = cli()
            .try_get_matches_from([PROGRAM_NAME, "not a real file"])
            .unwrap();
        assert_eq!(run(&args), 1);
    }

    #[test]
    fn bad_cli_usage() {
        // Something very wrong.
        let command_line = [PROGRAM_NAME, "this", "invocation", "is", "incorrect"];
        cli().try_get_matches_from(command_line).unwrap_err();

        // No options at all.
        let command_line = [PROGRAM_NAME];
        cli().try_get_matches_from(command_line).unwrap_err();
    }
}
