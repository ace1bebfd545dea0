use clap::{Parser, Subcommand};
use taxlearn::Config;
use taxlearn::model::entity::{
    Answer, AnswerCreate, Course, CourseCreate, Module, ModuleCreate, Question, QuestionCreate,
    UserEntity, UserEntityCreateUpdate,
};
use taxlearn::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use taxlearn::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the tax learning DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Migrate,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage assessment questions
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// `user` or `admin`
        #[arg(long, default_value = "user")]
        role: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "VAT")]
        category: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        /// Course title to attach the module to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
        #[arg(long)]
        passing_score: Option<i32>,
        #[arg(long)]
        max_attempts: Option<i32>,
        #[arg(long, default_value_t = false)]
        locked: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommands {
    Add {
        /// Module title to attach the question to
        #[arg(long)]
        module_title: String,
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i32).range(1..=1000))]
        points: i32,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
    AddAnswer {
        /// Question text to attach the answer to
        #[arg(long)]
        question_text: String,
        #[arg(long)]
        answer_text: String,
        #[arg(long, default_value_t = false)]
        is_correct: bool,
        #[arg(long)]
        order_index: Option<i32>,
    },
}

async fn find_id(mm: &ModelManager, sql: &str, key: &str) -> Result<uuid::Uuid, DatabaseError> {
    let id = sqlx::query_scalar(sql)
        .bind(key)
        .fetch_one(mm.executor())
        .await?;
    Ok(id)
}

#[tokio::main]
async fn main() -> taxlearn::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let database_uri = match std::env::var("DATABASE_URL") {
        Ok(uri) => uri,
        Err(_) => Config::get_or_init(true).await.app().database_uri().to_string(),
    };

    let db_con = DbConnection::connect(&database_uri)?;
    if let Commands::Migrate = args.command {
        db_con.migrate().await?;
        println!("Migrations applied");
        return Ok(());
    }

    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::Migrate => {}

        Commands::User { action } => match action {
            UserCommands::Add { username, password, role } => {
                let password_hash =
                    taxlearn::auth::hash_password(&password).map_err(DatabaseError::from)?;
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        username,
                        password_hash,
                        role: UserRole::from(role.as_str()),
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { title, description, category } => {
                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        description,
                        category: Some(category),
                        published: Some(true),
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                course_title,
                title,
                description,
                order_index,
                passing_score,
                max_attempts,
                locked,
            } => {
                let course_id =
                    find_id(&mm, "SELECT id FROM courses WHERE title = $1", &course_title).await?;

                let module = Module::create(
                    &mm,
                    &actor,
                    ModuleCreate {
                        course_id,
                        title,
                        description,
                        order_index: Some(order_index),
                        passing_score,
                        max_attempts,
                        is_locked: Some(locked),
                    },
                )
                .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Question { action } => match action {
            QuestionCommands::Add { module_title, text, points, order_index } => {
                let module_id =
                    find_id(&mm, "SELECT id FROM modules WHERE title = $1", &module_title).await?;

                let question = Question::create(
                    &mm,
                    &actor,
                    QuestionCreate {
                        module_id,
                        question_text: text,
                        points: Some(points),
                        order_index: Some(order_index),
                        answers: Vec::new(),
                    },
                )
                .await?;
                println!("Question created: {:?}", question);
            }

            QuestionCommands::AddAnswer { question_text, answer_text, is_correct, order_index } => {
                let question_id = find_id(
                    &mm,
                    "SELECT id FROM questions WHERE question_text = $1",
                    &question_text,
                )
                .await?;

                let answer = Answer::create(
                    &mm,
                    &actor,
                    AnswerCreate {
                        question_id,
                        answer_text,
                        is_correct: Some(is_correct),
                        order_index,
                    },
                )
                .await?;
                println!("Answer created: {:?}", answer);
            }
        },
    }

    Ok(())
}
