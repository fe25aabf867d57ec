//! Notification fan-out for created comments
//!
//! On comment creation, every project member except the comment's author
//! gets one notification document pointing at the review view for that
//! revision. The whole batch commits in one transaction, so "who gets
//! notified" is decoupled from per-recipient write failures.

use frameline_common::db::models::Notification;
use frameline_common::db::{comments, notifications, projects};
use frameline_common::Result;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Notification kind written by this trigger
pub const KIND_COMMENT: &str = "comment";

/// Fan a created comment out to the project's members.
///
/// Returns the number of notifications created. If the parent project no
/// longer exists the operation is a no-op: a comment cannot outlive a
/// meaningful project context.
pub async fn fan_out(
    db: &SqlitePool,
    project_id: Uuid,
    revision_id: Uuid,
    comment_id: Uuid,
    author_id: Option<Uuid>,
) -> Result<usize> {
    let Some(project) = projects::get_project(db, project_id).await? else {
        debug!("Project {} gone, skipping fan-out for {}", project_id, comment_id);
        return Ok(0);
    };

    // The author never receives a self-notification
    let recipients: Vec<Uuid> = projects::get_members(db, project_id)
        .await?
        .into_iter()
        .filter(|member| Some(*member) != author_id)
        .collect();

    if recipients.is_empty() {
        return Ok(0);
    }

    let author_name = match comments::get_comment(db, comment_id).await? {
        Some(comment) => comment.author_name,
        None => "A reviewer".to_string(),
    };

    let link = format!("/projects/{}/review/{}", project_id, revision_id);
    let now = chrono::Utc::now();
    let batch: Vec<Notification> = recipients
        .iter()
        .map(|user_id| Notification {
            id: Uuid::new_v4(),
            user_id: *user_id,
            kind: KIND_COMMENT.to_string(),
            body: format!("{} commented on {}", author_name, project.title),
            link: link.clone(),
            read: false,
            created_at: now,
        })
        .collect();

    notifications::create_batch(db, &batch).await?;
    info!(
        "Fanned comment {} out to {} member(s) of {}",
        comment_id,
        batch.len(),
        project_id
    );

    Ok(batch.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use frameline_common::db::init::init_test_database;
    use frameline_common::db::models::{Comment, CommentStatus, Project};
    use frameline_common::status::{PaymentStatus, ProjectStatus};

    async fn seed_project(db: &SqlitePool, members: &[Uuid]) -> Uuid {
        let project = Project {
            id: Uuid::new_v4(),
            title: "Launch film".to_string(),
            status: ProjectStatus::InReview,
            payment_status: PaymentStatus::Unpaid,
            total_cost: 1000.0,
            amount_paid: 0.0,
            current_revision_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        projects::create_project(db, &project).await.unwrap();
        for m in members {
            projects::add_member(db, project.id, *m).await.unwrap();
        }
        project.id
    }

    async fn seed_comment(db: &SqlitePool, project_id: Uuid, author_id: Option<Uuid>) -> Comment {
        let comment = Comment {
            id: Uuid::new_v4(),
            project_id,
            revision_id: Uuid::new_v4(),
            author_id,
            author_name: "Asha".to_string(),
            timestamp_secs: 12.0,
            body: "color looks off here".to_string(),
            status: CommentStatus::Open,
            created_at: Utc::now(),
        };
        comments::create_comment(db, &comment).await.unwrap();
        comment
    }

    #[tokio::test]
    async fn author_is_excluded_from_recipients() {
        let db = init_test_database().await.unwrap();
        let (u1, u2, u3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let project_id = seed_project(&db, &[u1, u2, u3]).await;
        let comment = seed_comment(&db, project_id, Some(u3)).await;

        let created = fan_out(&db, project_id, comment.revision_id, comment.id, Some(u3))
            .await
            .unwrap();
        assert_eq!(created, 2);

        // Exactly u1 and u2 were addressed, never u3
        assert_eq!(notifications::list_for_user(&db, u1).await.unwrap().len(), 1);
        assert_eq!(notifications::list_for_user(&db, u2).await.unwrap().len(), 1);
        assert_eq!(notifications::list_for_user(&db, u3).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn guest_comments_notify_all_members() {
        let db = init_test_database().await.unwrap();
        let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
        let project_id = seed_project(&db, &[u1, u2]).await;
        let comment = seed_comment(&db, project_id, None).await;

        let created = fan_out(&db, project_id, comment.revision_id, comment.id, None)
            .await
            .unwrap();
        assert_eq!(created, 2);
    }

    #[tokio::test]
    async fn missing_project_is_a_noop() {
        let db = init_test_database().await.unwrap();
        let created = fan_out(&db, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), None)
            .await
            .unwrap();
        assert_eq!(created, 0);
    }

    #[tokio::test]
    async fn notification_links_deep_into_review_view() {
        let db = init_test_database().await.unwrap();
        let member = Uuid::new_v4();
        let project_id = seed_project(&db, &[member]).await;
        let comment = seed_comment(&db, project_id, None).await;

        fan_out(&db, project_id, comment.revision_id, comment.id, None)
            .await
            .unwrap();

        let listed = notifications::list_for_user(&db, member).await.unwrap();
        assert_eq!(
            listed[0].link,
            format!("/projects/{}/review/{}", project_id, comment.revision_id)
        );
        assert!(listed[0].body.contains("Asha"));
        assert!(!listed[0].read);
    }
}
