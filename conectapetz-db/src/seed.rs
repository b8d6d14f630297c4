//! What a fresh installation starts with.

use conectapetz_common::{
    feed::Feed,
    model::{
        Id,
        post::{Author, Post},
    },
    reaction::Reactions,
};
use time::{OffsetDateTime, macros::datetime};

fn welcome_post(
    id: &str,
    (title, summary, body): (&str, &str, &str),
    author: &str,
    date: OffsetDateTime,
) -> Post {
    Post {
        id: Id::new(id),
        title: title.to_owned(),
        summary: summary.to_owned(),
        body: body.to_owned(),
        author: Author {
            name: author.to_owned(),
            email: None,
        },
        date,
        attachment: None,
        comments: Vec::new(),
        reactions: Reactions::default(),
    }
}

/// The welcome posts, newest first.
#[must_use]
pub fn welcome_feed() -> Feed {
    vec![
        welcome_post(
            "post-1",
            (
                "Bem-vindo ao ConectaPetz!",
                "Plataforma de conexão para amantes de pets",
                "O ConectaPetz é uma plataforma criada para conectar pessoas que amam animais. \
                 Aqui você pode compartilhar experiências, dicas, fotos e muito mais sobre seus \
                 pets. Vamos criar uma comunidade incrível juntos! 🐾",
            ),
            "Equipe ConectaPetz",
            datetime!(2025-11-03 10:00 UTC),
        ),
        welcome_post(
            "post-2",
            (
                "Dicas de alimentação saudável",
                "Como escolher a melhor ração para seu pet",
                "A alimentação é fundamental para a saúde do seu pet. Sempre consulte um \
                 veterinário para escolher a ração adequada, considere a idade, tamanho e \
                 necessidades específicas do animal. Uma alimentação balanceada garante mais \
                 energia e qualidade de vida! 🐕",
            ),
            "Dr. PetCare",
            datetime!(2025-11-02 14:30 UTC),
        ),
        welcome_post(
            "post-3",
            (
                "Evento: Caminhada Solidária",
                "Participe da nossa caminhada beneficente",
                "No próximo domingo, vamos realizar uma caminhada solidária para arrecadar ração \
                 e materiais para animais em situação de abandono. Todos estão convidados! O \
                 ponto de encontro será no Parque Central às 8h. Traga seu pet e venha fazer \
                 parte dessa ação! 🚶‍♀️🐾",
            ),
            "Organização Pet Amigo",
            datetime!(2025-11-01 09:15 UTC),
        ),
        welcome_post(
            "post-4",
            (
                "Adoção responsável",
                "Reflita antes de adotar um pet",
                "Adotar um pet é uma decisão que requer responsabilidade e compromisso. Antes de \
                 adotar, pense se você tem tempo, espaço, recursos financeiros e dedicação para \
                 cuidar de um animal por muitos anos. A adoção é para a vida toda! 💙",
            ),
            "ONG PetResgate",
            datetime!(2025-10-31 16:45 UTC),
        ),
        welcome_post(
            "post-5",
            (
                "Curiosidades sobre gatos",
                "Você sabia que gatos têm 32 músculos em cada orelha?",
                "Os gatos são animais fascinantes! Eles têm 32 músculos em cada orelha, o que \
                 permite que movam as orelhas de forma independente. Além disso, gatos passam \
                 cerca de 2/3 do dia dormindo. Que tal compartilhar uma curiosidade sobre seu \
                 pet? 🐱",
            ),
            "Amante dos Gatos",
            datetime!(2025-10-30 11:20 UTC),
        ),
    ]
    .into()
}

#[cfg(test)]
mod tests {
    use crate::seed::welcome_feed;

    #[test]
    fn welcome_posts_are_newest_first_and_read_only() {
        let feed = welcome_feed();
        let posts = feed.posts();

        assert_eq!(posts.len(), 5);
        assert!(posts.windows(2).all(|pair| pair[0].date > pair[1].date));
        assert!(posts.iter().all(|post| post.author.email.is_none()));
        assert!(posts.iter().all(|post| post.reactions.counts().total() == 0));
    }
}
