use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use edustream_client::auth::{AuthClient, AuthPresence};
use edustream_client::config::Config;
use edustream_client::errors::AppResult;
use edustream_client::models::domain::OptionLabel;
use edustream_client::models::dto::LoginRequest;
use edustream_client::providers::{HttpQuizProvider, HttpResultSink};
use edustream_client::services::{QuizSessionService, SaveOutcome, SessionState};
use edustream_client::storage::{FilePendingStore, FileTokenStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let video_id = match std::env::args().nth(1) {
        Some(id) => id,
        None => {
            eprintln!("usage: edustream-client <video-id>");
            std::process::exit(2);
        }
    };

    let config = Config::from_env();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let tokens = Arc::new(FileTokenStore::new(&config.storage_dir)?);
    let auth = Arc::new(AuthPresence::new(tokens));
    let provider = Arc::new(HttpQuizProvider::new(
        client.clone(),
        config.api_base_url.clone(),
    ));
    let sink = Arc::new(HttpResultSink::new(
        client.clone(),
        config.api_base_url.clone(),
        auth.clone(),
    ));
    let pending = Arc::new(FilePendingStore::new(&config.storage_dir)?);
    let auth_client = AuthClient::new(client, config.api_base_url.clone(), auth.clone());

    let mut session = QuizSessionService::new(provider, sink, auth, pending);
    session.load(&video_id).await?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(question) = session.current_question().cloned() {
        println!("\n{}", question.prompt);
        for option in &question.options {
            println!("  {}. {}", option.label, option.text);
        }

        let label = loop {
            let Some(input) = prompt(&mut lines, "Your answer [A-D]: ")? else {
                println!("\nQuiz abandoned.");
                return Ok(());
            };
            match OptionLabel::parse(&input) {
                Some(label) => break label,
                None => println!("Please enter A, B, C or D."),
            }
        };

        session.select_answer(label)?;
        session.advance()?;
    }

    let score = *session
        .score()
        .ok_or("session ended without a score")?;
    println!(
        "\nYou scored {}/{} ({}%)",
        score.correct, score.total, score.percentage
    );

    if let (Some(submission), Some(document)) = (session.submission(), session.document()) {
        for answer in submission.answers.iter().filter(|a| !a.is_correct) {
            let question = &document.questions[answer.question_index];
            println!(
                "\nQuestion {}: correct answer is {}. {}",
                answer.question_index + 1,
                question.correct_label,
                question.explanation
            );
        }
    }

    match session.submit().await? {
        SessionState::Submitted => println!("\nYour result has been saved."),
        SessionState::SubmitError(reason) => {
            println!("\nCould not save your result: {}", reason);
            retry_loop(&mut session, &mut lines).await?;
        }
        SessionState::AwaitingAuth => {
            println!("\nSign in to save your progress.");
            sign_in_and_save(&mut session, &auth_client, &mut lines).await?;
        }
        _ => {}
    }

    Ok(())
}

async fn retry_loop(
    session: &mut QuizSessionService,
    lines: &mut io::Lines<io::StdinLock<'_>>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let Some(answer) = prompt(lines, "Retry? [y/N]: ")? else {
            return Ok(());
        };
        if !answer.trim().eq_ignore_ascii_case("y") {
            return Ok(());
        }
        match session.retry_submit().await? {
            SessionState::Submitted => {
                println!("Your result has been saved.");
                return Ok(());
            }
            SessionState::SubmitError(reason) => {
                println!("Still failing: {}", reason);
            }
            _ => return Ok(()),
        }
    }
}

async fn sign_in_and_save(
    session: &mut QuizSessionService,
    auth_client: &AuthClient,
    lines: &mut io::Lines<io::StdinLock<'_>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(email) = prompt(lines, "Email: ")? else {
        return Ok(());
    };
    let Some(password) = prompt(lines, "Password: ")? else {
        return Ok(());
    };

    let login: AppResult<()> = auth_client
        .login(&LoginRequest { email, password })
        .await;
    if let Err(err) = login {
        println!("Sign-in failed: {}. Your result is kept locally.", err);
        return Ok(());
    }

    match session.save_pending().await? {
        SaveOutcome::Submitted => println!("Your result has been saved."),
        SaveOutcome::SubmitFailed(reason) => {
            println!("Could not save your result: {}", reason);
            retry_loop(session, lines).await?;
        }
        SaveOutcome::RedirectToRegistration(_) => {
            println!("You still need an account. Your result is kept locally.");
        }
    }
    Ok(())
}

fn prompt(
    lines: &mut io::Lines<io::StdinLock<'_>>,
    message: &str,
) -> io::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    lines.next().transpose()
}
