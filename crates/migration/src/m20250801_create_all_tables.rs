use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn cascade<T: IntoIden + 'static, U: IntoIden, V: IntoIden + 'static, W: IntoIden>(
    name: &str,
    from_table: T,
    from_col: U,
    to_table: V,
    to_col: W,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(from_table, from_col)
        .to(to_table, to_col)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id_col(Users::Id))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsStudent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsTeacher)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::DateJoined)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create profiles table (one per user)
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(id_col(Profiles::Id))
                    .col(
                        ColumnDef::new(Profiles::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Profiles::AwardPoints)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::Location)
                            .string_len(30)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Profiles::Birthdate).date())
                    .foreign_key(&mut cascade(
                        "fk-profiles-user_id",
                        Profiles::Table,
                        Profiles::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create subjects table
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(id_col(Subjects::Id))
                    .col(ColumnDef::new(Subjects::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Subjects::Slug)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(id_col(Courses::Id))
                    .col(ColumnDef::new(Courses::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Courses::SubjectId).integer().not_null())
                    .col(ColumnDef::new(Courses::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Courses::Slug).string_len(200).not_null())
                    .col(ColumnDef::new(Courses::SlugMonth).string_len(7).not_null())
                    .col(ColumnDef::new(Courses::Overview).text().not_null())
                    .col(
                        ColumnDef::new(Courses::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut cascade(
                        "fk-courses-owner_id",
                        Courses::Table,
                        Courses::OwnerId,
                        Users::Table,
                        Users::Id,
                    ))
                    .foreign_key(&mut cascade(
                        "fk-courses-subject_id",
                        Courses::Table,
                        Courses::SubjectId,
                        Subjects::Table,
                        Subjects::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create course_students junction table (many-to-many)
        manager
            .create_table(
                Table::create()
                    .table(CourseStudents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CourseStudents::CourseId).integer().not_null())
                    .col(ColumnDef::new(CourseStudents::UserId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(CourseStudents::CourseId)
                            .col(CourseStudents::UserId),
                    )
                    .foreign_key(&mut cascade(
                        "fk-course_students-course_id",
                        CourseStudents::Table,
                        CourseStudents::CourseId,
                        Courses::Table,
                        Courses::Id,
                    ))
                    .foreign_key(&mut cascade(
                        "fk-course_students-user_id",
                        CourseStudents::Table,
                        CourseStudents::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create modules table
        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(id_col(Modules::Id))
                    .col(ColumnDef::new(Modules::CourseId).integer().not_null())
                    .col(ColumnDef::new(Modules::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Modules::Description).text().not_null())
                    .col(ColumnDef::new(Modules::Content).text())
                    .col(ColumnDef::new(Modules::Order).integer().not_null())
                    .foreign_key(&mut cascade(
                        "fk-modules-course_id",
                        Modules::Table,
                        Modules::CourseId,
                        Courses::Table,
                        Courses::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create contents table (typed pointer to an item table)
        manager
            .create_table(
                Table::create()
                    .table(Contents::Table)
                    .if_not_exists()
                    .col(id_col(Contents::Id))
                    .col(ColumnDef::new(Contents::ModuleId).integer().not_null())
                    .col(ColumnDef::new(Contents::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Contents::ObjectId).integer().not_null())
                    .col(ColumnDef::new(Contents::Order).integer().not_null())
                    .foreign_key(&mut cascade(
                        "fk-contents-module_id",
                        Contents::Table,
                        Contents::ModuleId,
                        Modules::Table,
                        Modules::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create one table per content item kind
        for (table, payload) in [
            (Items::Texts, Items::Content),
            (Items::Files, Items::File),
            (Items::Images, Items::File),
            (Items::Videos, Items::Url),
        ] {
            let payload_col = match payload {
                Items::Content => ColumnDef::new(payload).text().not_null().to_owned(),
                _ => ColumnDef::new(payload).string_len(200).not_null().to_owned(),
            };
            let fk_name = format!("fk-{}-owner_id", table.to_string());

            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(id_col(Items::Id))
                        .col(ColumnDef::new(Items::OwnerId).integer().not_null())
                        .col(ColumnDef::new(Items::Title).string_len(250).not_null())
                        .col(
                            ColumnDef::new(Items::Created)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Items::Updated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(payload_col)
                        .foreign_key(&mut cascade(
                            &fk_name,
                            table,
                            Items::OwnerId,
                            Users::Table,
                            Users::Id,
                        ))
                        .to_owned(),
                )
                .await?;
        }

        // Create reviews table
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(id_col(Reviews::Id))
                    .col(ColumnDef::new(Reviews::CourseId).integer().not_null())
                    .col(ColumnDef::new(Reviews::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Reviews::PubDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reviews::Comment).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Reviews::Rating)
                            .integer()
                            .not_null()
                            .check(Expr::col(Reviews::Rating).between(1, 5)),
                    )
                    .foreign_key(&mut cascade(
                        "fk-reviews-course_id",
                        Reviews::Table,
                        Reviews::CourseId,
                        Courses::Table,
                        Courses::Id,
                    ))
                    .foreign_key(&mut cascade(
                        "fk-reviews-user_id",
                        Reviews::Table,
                        Reviews::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create badge_awards table
        manager
            .create_table(
                Table::create()
                    .table(BadgeAwards::Table)
                    .if_not_exists()
                    .col(id_col(BadgeAwards::Id))
                    .col(ColumnDef::new(BadgeAwards::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(BadgeAwards::AwardedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BadgeAwards::Slug).string_len(255).not_null())
                    .col(ColumnDef::new(BadgeAwards::Level).integer().not_null())
                    .foreign_key(&mut cascade(
                        "fk-badge_awards-user_id",
                        BadgeAwards::Table,
                        BadgeAwards::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create tags table
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(id_col(Tags::Id))
                    .col(ColumnDef::new(Tags::Name).string_len(30).not_null())
                    .col(
                        ColumnDef::new(Tags::Color)
                            .string_len(7)
                            .not_null()
                            .default("#007bff"),
                    )
                    .to_owned(),
            )
            .await?;

        // Create quizzes table
        manager
            .create_table(
                Table::create()
                    .table(Quizzes::Table)
                    .if_not_exists()
                    .col(id_col(Quizzes::Id))
                    .col(ColumnDef::new(Quizzes::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Quizzes::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Quizzes::TagId).integer().not_null())
                    .foreign_key(&mut cascade(
                        "fk-quizzes-owner_id",
                        Quizzes::Table,
                        Quizzes::OwnerId,
                        Users::Table,
                        Users::Id,
                    ))
                    .foreign_key(&mut cascade(
                        "fk-quizzes-tag_id",
                        Quizzes::Table,
                        Quizzes::TagId,
                        Tags::Table,
                        Tags::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create questions table
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(id_col(Questions::Id))
                    .col(ColumnDef::new(Questions::QuizId).integer().not_null())
                    .col(ColumnDef::new(Questions::Text).string_len(255).not_null())
                    .foreign_key(&mut cascade(
                        "fk-questions-quiz_id",
                        Questions::Table,
                        Questions::QuizId,
                        Quizzes::Table,
                        Quizzes::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create answers table
        manager
            .create_table(
                Table::create()
                    .table(Answers::Table)
                    .if_not_exists()
                    .col(id_col(Answers::Id))
                    .col(ColumnDef::new(Answers::QuestionId).integer().not_null())
                    .col(ColumnDef::new(Answers::Text).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Answers::IsCorrect)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(&mut cascade(
                        "fk-answers-question_id",
                        Answers::Table,
                        Answers::QuestionId,
                        Questions::Table,
                        Questions::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create students table (shares the user's id)
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .foreign_key(&mut cascade(
                        "fk-students-user_id",
                        Students::Table,
                        Students::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create student_interests junction table (many-to-many)
        manager
            .create_table(
                Table::create()
                    .table(StudentInterests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentInterests::StudentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudentInterests::TagId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(StudentInterests::StudentId)
                            .col(StudentInterests::TagId),
                    )
                    .foreign_key(&mut cascade(
                        "fk-student_interests-student_id",
                        StudentInterests::Table,
                        StudentInterests::StudentId,
                        Students::Table,
                        Students::UserId,
                    ))
                    .foreign_key(&mut cascade(
                        "fk-student_interests-tag_id",
                        StudentInterests::Table,
                        StudentInterests::TagId,
                        Tags::Table,
                        Tags::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create taken_quizzes table
        manager
            .create_table(
                Table::create()
                    .table(TakenQuizzes::Table)
                    .if_not_exists()
                    .col(id_col(TakenQuizzes::Id))
                    .col(ColumnDef::new(TakenQuizzes::StudentId).integer().not_null())
                    .col(ColumnDef::new(TakenQuizzes::QuizId).integer().not_null())
                    .col(ColumnDef::new(TakenQuizzes::Score).double().not_null())
                    .col(
                        ColumnDef::new(TakenQuizzes::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut cascade(
                        "fk-taken_quizzes-student_id",
                        TakenQuizzes::Table,
                        TakenQuizzes::StudentId,
                        Students::Table,
                        Students::UserId,
                    ))
                    .foreign_key(&mut cascade(
                        "fk-taken_quizzes-quiz_id",
                        TakenQuizzes::Table,
                        TakenQuizzes::QuizId,
                        Quizzes::Table,
                        Quizzes::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // Create student_answers table
        manager
            .create_table(
                Table::create()
                    .table(StudentAnswers::Table)
                    .if_not_exists()
                    .col(id_col(StudentAnswers::Id))
                    .col(
                        ColumnDef::new(StudentAnswers::StudentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudentAnswers::AnswerId).integer().not_null())
                    .foreign_key(&mut cascade(
                        "fk-student_answers-student_id",
                        StudentAnswers::Table,
                        StudentAnswers::StudentId,
                        Students::Table,
                        Students::UserId,
                    ))
                    .foreign_key(&mut cascade(
                        "fk-student_answers-answer_id",
                        StudentAnswers::Table,
                        StudentAnswers::AnswerId,
                        Answers::Table,
                        Answers::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        let tables: Vec<DynIden> = vec![
            StudentAnswers::Table.into_iden(),
            TakenQuizzes::Table.into_iden(),
            StudentInterests::Table.into_iden(),
            Students::Table.into_iden(),
            Answers::Table.into_iden(),
            Questions::Table.into_iden(),
            Quizzes::Table.into_iden(),
            Tags::Table.into_iden(),
            BadgeAwards::Table.into_iden(),
            Reviews::Table.into_iden(),
            Items::Videos.into_iden(),
            Items::Images.into_iden(),
            Items::Files.into_iden(),
            Items::Texts.into_iden(),
            Contents::Table.into_iden(),
            Modules::Table.into_iden(),
            CourseStudents::Table.into_iden(),
            Courses::Table.into_iden(),
            Subjects::Table.into_iden(),
            Profiles::Table.into_iden(),
            Users::Table.into_iden(),
        ];

        for table in tables {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    IsStudent,
    IsTeacher,
    IsActive,
    DateJoined,
}

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
    UserId,
    AwardPoints,
    Location,
    Birthdate,
}

#[derive(Iden)]
enum Subjects {
    Table,
    Id,
    Title,
    Slug,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    OwnerId,
    SubjectId,
    Title,
    Slug,
    SlugMonth,
    Overview,
    Created,
}

#[derive(Iden)]
enum CourseStudents {
    Table,
    CourseId,
    UserId,
}

#[derive(Iden)]
enum Modules {
    Table,
    Id,
    CourseId,
    Title,
    Description,
    Content,
    Order,
}

#[derive(Iden)]
enum Contents {
    Table,
    Id,
    ModuleId,
    Kind,
    ObjectId,
    Order,
}

/// Tables and columns shared by the four content item kinds
#[derive(Iden, Clone, Copy)]
enum Items {
    Texts,
    Files,
    Images,
    Videos,
    Id,
    OwnerId,
    Title,
    Created,
    Updated,
    Content,
    File,
    Url,
}

#[derive(Iden)]
enum Reviews {
    Table,
    Id,
    CourseId,
    UserId,
    PubDate,
    Comment,
    Rating,
}

#[derive(Iden)]
enum BadgeAwards {
    Table,
    Id,
    UserId,
    AwardedAt,
    Slug,
    Level,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    Name,
    Color,
}

#[derive(Iden)]
enum Quizzes {
    Table,
    Id,
    OwnerId,
    Name,
    TagId,
}

#[derive(Iden)]
enum Questions {
    Table,
    Id,
    QuizId,
    Text,
}

#[derive(Iden)]
enum Answers {
    Table,
    Id,
    QuestionId,
    Text,
    IsCorrect,
}

#[derive(Iden)]
enum Students {
    Table,
    UserId,
}

#[derive(Iden)]
enum StudentInterests {
    Table,
    StudentId,
    TagId,
}

#[derive(Iden)]
enum TakenQuizzes {
    Table,
    Id,
    StudentId,
    QuizId,
    Score,
    Date,
}

#[derive(Iden)]
enum StudentAnswers {
    Table,
    Id,
    StudentId,
    AnswerId,
}
