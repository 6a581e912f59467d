use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Positions are unique within their parent; concurrent appends fail instead of colliding
        manager
            .create_index(
                Index::create()
                    .name("uq_modules_course_id_order")
                    .table(Modules::Table)
                    .col(Modules::CourseId)
                    .col(Modules::Order)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_contents_module_id_order")
                    .table(Contents::Table)
                    .col(Contents::ModuleId)
                    .col(Contents::Order)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Course slugs are unique per calendar month of creation
        manager
            .create_index(
                Index::create()
                    .name("uq_courses_slug_slug_month")
                    .table(Courses::Table)
                    .col(Courses::Slug)
                    .col(Courses::SlugMonth)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Lookup indexes for common query patterns
        manager
            .create_index(
                Index::create()
                    .name("idx_courses_owner_id")
                    .table(Courses::Table)
                    .col(Courses::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_subject_id_created")
                    .table(Courses::Table)
                    .col(Courses::SubjectId)
                    .col(Courses::Created)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contents_kind_object_id")
                    .table(Contents::Table)
                    .col(Contents::Kind)
                    .col(Contents::ObjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_course_id")
                    .table(Reviews::Table)
                    .col(Reviews::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_badge_awards_user_id")
                    .table(BadgeAwards::Table)
                    .col(BadgeAwards::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_quizzes_tag_id")
                    .table(Quizzes::Table)
                    .col(Quizzes::TagId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_taken_quizzes_student_id_quiz_id")
                    .table(TakenQuizzes::Table)
                    .col(TakenQuizzes::StudentId)
                    .col(TakenQuizzes::QuizId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_answers_student_id")
                    .table(StudentAnswers::Table)
                    .col(StudentAnswers::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let indexes: [(&str, DynIden); 11] = [
            ("uq_modules_course_id_order", Modules::Table.into_iden()),
            ("uq_contents_module_id_order", Contents::Table.into_iden()),
            ("uq_courses_slug_slug_month", Courses::Table.into_iden()),
            ("idx_courses_owner_id", Courses::Table.into_iden()),
            ("idx_courses_subject_id_created", Courses::Table.into_iden()),
            ("idx_contents_kind_object_id", Contents::Table.into_iden()),
            ("idx_reviews_course_id", Reviews::Table.into_iden()),
            ("idx_badge_awards_user_id", BadgeAwards::Table.into_iden()),
            ("idx_quizzes_tag_id", Quizzes::Table.into_iden()),
            (
                "idx_taken_quizzes_student_id_quiz_id",
                TakenQuizzes::Table.into_iden(),
            ),
            (
                "idx_student_answers_student_id",
                StudentAnswers::Table.into_iden(),
            ),
        ];

        for (name, table) in indexes {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    OwnerId,
    SubjectId,
    Slug,
    SlugMonth,
    Created,
}

#[derive(Iden)]
enum Modules {
    Table,
    CourseId,
    Order,
}

#[derive(Iden)]
enum Contents {
    Table,
    ModuleId,
    Kind,
    ObjectId,
    Order,
}

#[derive(Iden)]
enum Reviews {
    Table,
    CourseId,
}

#[derive(Iden)]
enum BadgeAwards {
    Table,
    UserId,
}

#[derive(Iden)]
enum Quizzes {
    Table,
    TagId,
}

#[derive(Iden)]
enum TakenQuizzes {
    Table,
    StudentId,
    QuizId,
}

#[derive(Iden)]
enum StudentAnswers {
    Table,
    StudentId,
}
