//! Deterministic template replies
//!
//! Used when generation is unavailable or a draft is rejected. Every
//! reply is assembled only from structured fields, so the fallback path
//! cannot introduce unsupported claims.

use vitrine_core::PageData;

/// Build a reply for `question`, keyed on simple intent keywords.
pub fn template_reply(question: &str, data: &PageData) -> String {
    let q = question.to_lowercase();

    if contains_any(&q, &["preço", "preco", "valor", "custa", "investimento", "quanto"]) {
        let price = field_or(&data.price, "Consulte o preço na página");
        return format!(
            "O investimento é de {price}. É um excelente custo-benefício considerando tudo \
             que você vai receber! Quer saber mais sobre o que está incluso?"
        );
    }

    if contains_any(&q, &["benefício", "beneficio", "vantagem", "inclui", "recebo"]) {
        if data.has_benefits() {
            let listed = data
                .benefits
                .iter()
                .take(3)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n• ");
            return format!(
                "Os principais benefícios são:\n• {listed}\n\nQual desses benefícios mais \
                 te interessa?"
            );
        }
        return "Este produto foi pensado para transformar seus resultados! Quer saber \
                mais detalhes?"
            .to_string();
    }

    if contains_any(&q, &["garantia", "reembolso", "risco", "seguro"]) {
        let guarantee = field_or(&data.guarantee, "garantia de satisfação");
        return format!(
            "Sim! Oferecemos {guarantee}. Você pode experimentar sem riscos! Isso te deixa \
             mais confiante para começar?"
        );
    }

    if contains_any(&q, &["comprar", "adquirir", "como", "onde", "link"]) {
        let cta = field_or(&data.cta, "Compre Agora");
        return format!(
            "É muito simples! Clique em '{cta}' na página para garantir o seu. Tem alguma \
             dúvida antes de finalizar?"
        );
    }

    if contains_any(&q, &["olá", "ola", "oi", "bom dia", "boa tarde", "boa noite"]) {
        let title = field_or(&data.title, "nosso produto");
        return format!(
            "Olá! Que bom te ver aqui! Sou especialista em '{title}' e estou aqui para te \
             ajudar. O que gostaria de saber?"
        );
    }

    if contains_any(&q, &["sim", "ok", "certo", "entendi"]) {
        return "Perfeito! Fico feliz que esteja interessado. Que tal conhecer os \
                benefícios exclusivos que preparamos para você?"
            .to_string();
    }

    if contains_any(&q, &["não", "nao"]) {
        return "Entendo! Sem problemas. Talvez eu possa esclarecer alguma dúvida que você \
                tenha? Estou aqui para ajudar no que precisar."
            .to_string();
    }

    let title = field_or(&data.title, "nosso produto");
    format!(
        "Interessante pergunta! Sobre '{title}', posso te ajudar com informações sobre \
         preços, benefícios, garantias e processo de compra. O que mais te interessa saber?"
    )
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

fn field_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}
