use crate::{models::SqlMember, Db};
use domain::Member;

const MEMBER_COLUMNS: &str = "id, name, nickname, age, birthday, position, personality, hobbies, \
     image_color, catchphrase, profile_image_url, created_at, updated_at";

impl Db {
    pub async fn list_members(&self) -> anyhow::Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, SqlMember>(&format!(
            "SELECT {} FROM members ORDER BY created_at ASC",
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_member(&self, id: &str) -> anyhow::Result<Option<Member>> {
        let row = sqlx::query_as::<_, SqlMember>(&format!(
            "SELECT {} FROM members WHERE id = ?",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn upsert_member(&self, m: &Member) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members (
                id, name, nickname, age, birthday, position, personality, hobbies,
                image_color, catchphrase, profile_image_url, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                nickname = excluded.nickname,
                age = excluded.age,
                birthday = excluded.birthday,
                position = excluded.position,
                personality = excluded.personality,
                hobbies = excluded.hobbies,
                image_color = excluded.image_color,
                catchphrase = excluded.catchphrase,
                profile_image_url = excluded.profile_image_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&m.id)
        .bind(&m.name)
        .bind(&m.nickname)
        .bind(m.age)
        .bind(&m.birthday)
        .bind(&m.position)
        .bind(&m.personality)
        .bind(&m.hobbies)
        .bind(&m.image_color)
        .bind(&m.catchphrase)
        .bind(&m.profile_image_url)
        .bind(m.created_at)
        .bind(m.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
