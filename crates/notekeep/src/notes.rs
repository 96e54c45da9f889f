// Notes service: owner-scoped create, list, delete. Every operation resolves
// the bearer identity to a live user record first, so notes can never be
// read or written on behalf of a deleted account.

use notekeep_core::db::{schema, FindQuery, Note, Sort, User, Where};
use notekeep_core::error::{ApiError, ErrorCode};

use crate::auth::{find_user_by_email, server_error};
use crate::context::AppContext;
use crate::crypto::jwt::TokenIdentity;

const NOTES_FAILED: &str = "Server error";

async fn resolve_owner(ctx: &AppContext, identity: &TokenIdentity) -> Result<User, ApiError> {
    find_user_by_email(ctx.adapter.as_ref(), &identity.email)
        .await
        .map_err(server_error(NOTES_FAILED))?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound))
}

/// List the owner's notes, newest first.
pub async fn list_notes(ctx: &AppContext, identity: &TokenIdentity) -> Result<Vec<Note>, ApiError> {
    let owner = resolve_owner(ctx, identity).await?;

    let docs = ctx
        .adapter
        .find_many(
            schema::NOTES,
            FindQuery {
                filters: vec![Where::eq("createdBy", owner.id)],
                sort: Some(Sort::desc("createdAt")),
                limit: None,
            },
        )
        .await
        .map_err(server_error(NOTES_FAILED))?;

    docs.into_iter()
        .map(Note::from_doc)
        .collect::<Result<_, _>>()
        .map_err(server_error(NOTES_FAILED))
}

pub async fn create_note(
    ctx: &AppContext,
    identity: &TokenIdentity,
    body: Option<String>,
) -> Result<Note, ApiError> {
    let body = body
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request(ErrorCode::NoteRequired))?;

    let owner = resolve_owner(ctx, identity).await?;

    let note = Note::new(body, &owner.id);
    let doc = note.to_doc().map_err(server_error(NOTES_FAILED))?;
    ctx.adapter
        .create(schema::NOTES, doc)
        .await
        .map_err(server_error(NOTES_FAILED))?;

    Ok(note)
}

/// Delete one of the owner's notes. The ownership filter is part of the
/// delete itself, so another user's note id reads as not found.
pub async fn delete_note(
    ctx: &AppContext,
    identity: &TokenIdentity,
    note_id: &str,
) -> Result<Note, ApiError> {
    let owner = resolve_owner(ctx, identity).await?;

    let deleted = ctx
        .adapter
        .delete_one(
            schema::NOTES,
            &[Where::eq("id", note_id), Where::eq("createdBy", owner.id)],
        )
        .await
        .map_err(server_error(NOTES_FAILED))?;

    match deleted {
        Some(doc) => Note::from_doc(doc).map_err(server_error(NOTES_FAILED)),
        None => Err(ApiError::not_found(ErrorCode::NoteNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::request::SignUpBody;
    use crate::auth::sign_up::{handle_sign_up, SignUpOutcome};
    use crate::auth::test_support::password_ctx;
    use crate::crypto::jwt::verify_token;

    async fn signed_up(ctx: &AppContext, email: &str) -> TokenIdentity {
        let outcome = handle_sign_up(
            ctx,
            SignUpBody {
                name: Some("A".into()),
                email: Some(email.into()),
                date_of_birth: None,
                otp: None,
                password: Some("hunter22".into()),
            },
        )
        .await
        .unwrap();
        let SignUpOutcome::Created(success) = outcome else {
            panic!("expected Created");
        };
        verify_token(&success.token, &ctx.config.jwt_secret).unwrap()
    }

    #[tokio::test]
    async fn empty_note_is_rejected() {
        let (ctx, _mailer) = password_ctx();
        let me = signed_up(&ctx, "a@x.com").await;

        for body in [None, Some(String::new()), Some("   ".into())] {
            let err = create_note(&ctx, &me, body).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::NoteRequired);
        }
    }

    #[tokio::test]
    async fn note_body_is_trimmed() {
        let (ctx, _mailer) = password_ctx();
        let me = signed_up(&ctx, "a@x.com").await;

        let note = create_note(&ctx, &me, Some("  groceries  ".into()))
            .await
            .unwrap();
        assert_eq!(note.note, "groceries");
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let (ctx, _mailer) = password_ctx();
        let me = signed_up(&ctx, "a@x.com").await;

        create_note(&ctx, &me, Some("first".into())).await.unwrap();
        create_note(&ctx, &me, Some("second".into())).await.unwrap();
        create_note(&ctx, &me, Some("third".into())).await.unwrap();

        let notes = list_notes(&ctx, &me).await.unwrap();
        let bodies: Vec<_> = notes.iter().map(|n| n.note.as_str()).collect();
        assert_eq!(bodies, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn notes_are_owner_scoped() {
        let (ctx, _mailer) = password_ctx();
        let alice = signed_up(&ctx, "alice@x.com").await;
        let bob = signed_up(&ctx, "bob@x.com").await;

        let theirs = create_note(&ctx, &alice, Some("private".into()))
            .await
            .unwrap();

        assert!(list_notes(&ctx, &bob).await.unwrap().is_empty());

        // Bob cannot delete Alice's note, and the note survives the attempt.
        let err = delete_note(&ctx, &bob, &theirs.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoteNotFound);
        assert_eq!(list_notes(&ctx, &alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_returns_the_removed_note() {
        let (ctx, _mailer) = password_ctx();
        let me = signed_up(&ctx, "a@x.com").await;

        let note = create_note(&ctx, &me, Some("to remove".into()))
            .await
            .unwrap();
        let removed = delete_note(&ctx, &me, &note.id).await.unwrap();
        assert_eq!(removed.id, note.id);

        let err = delete_note(&ctx, &me, &note.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoteNotFound);
        assert!(list_notes(&ctx, &me).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_identity_is_not_found() {
        let (ctx, _mailer) = password_ctx();
        let ghost = TokenIdentity {
            id: "gone".into(),
            email: "ghost@x.com".into(),
            display_name: None,
        };
        let err = list_notes(&ctx, &ghost).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
