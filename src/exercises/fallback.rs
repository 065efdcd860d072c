//! Static fallback content
//!
//! Hand-authored sets for every category and tier, served when generation
//! and repair both fail. Every set here passes [`AnswerValidator`]; the
//! tests hold that for all combinations.
//!
//! [`AnswerValidator`]: super::validator::AnswerValidator

use super::text;
use super::types::{
    Category, CompletionItem, ErrorDetectionItem, ExerciseItem, ExerciseSet, MultipleChoiceItem,
    Provenance, WordReorderingItem,
};
use crate::proficiency::ProficiencyTier;

/// Prompt, options, correct option, explanation
type ChoiceRow = (&'static str, [&'static str; 4], &'static str, &'static str);
/// Prompt, answer, hint, explanation
type CompletionRow = (&'static str, &'static str, &'static str, &'static str);
/// Sentence, alternative orders, explanation
type ReorderRow = (&'static str, &'static [&'static str], &'static str);
/// Sentence containing one error, the faulty word, explanation
type ErrorRow = (&'static str, &'static str, &'static str);

const VOCABULARY: [[ChoiceRow; 5]; 6] = [
    [
        ("Mis on 'leib' inglise keeles?", ["bread", "milk", "butter", "cheese"], "bread", "Leib is dark rye bread."),
        ("Mis on 'koer' inglise keeles?", ["cat", "dog", "horse", "bird"], "dog", "Koer means dog."),
        ("Mis on 'maja' inglise keeles?", ["street", "room", "house", "garden"], "house", "Maja means house."),
        ("Mis on 'vesi' inglise keeles?", ["water", "juice", "tea", "soup"], "water", "Vesi means water."),
        ("Mis on 'punane' inglise keeles?", ["blue", "green", "yellow", "red"], "red", "Punane means red."),
    ],
    [
        ("Mis on 'raamatukogu' inglise keeles?", ["bookshop", "library", "school", "museum"], "library", "Raamat (book) + kogu (collection)."),
        ("Mis on 'hommikusöök' inglise keeles?", ["dinner", "lunch", "breakfast", "snack"], "breakfast", "Hommik (morning) + söök (meal)."),
        ("Mis on 'rong' inglise keeles?", ["train", "bus", "tram", "ship"], "train", "Rong means train."),
        ("Mis on 'naaber' inglise keeles?", ["friend", "colleague", "relative", "neighbour"], "neighbour", "Naaber means neighbour."),
        ("Mis on 'ilm' inglise keeles?", ["weather", "season", "wind", "sky"], "weather", "Ilm means weather."),
    ],
    [
        ("Mis on 'kohtumine' inglise keeles?", ["meeting", "decision", "journey", "message"], "meeting", "From kohtuma, to meet."),
        ("Mis on 'tervis' inglise keeles?", ["illness", "health", "medicine", "doctor"], "health", "Tervis means health."),
        ("Mis on 'puhkus' inglise keeles?", ["work", "holiday", "weekend", "salary"], "holiday", "From puhkama, to rest."),
        ("Mis on 'üür' inglise keeles?", ["tax", "price", "rent", "debt"], "rent", "Üür is the rent paid for housing."),
        ("Mis on 'kogemus' inglise keeles?", ["knowledge", "habit", "memory", "experience"], "experience", "From kogema, to experience."),
    ],
    [
        ("Mis on 'võrdlus' inglise keeles?", ["comparison", "agreement", "difference", "measurement"], "comparison", "From võrdlema, to compare."),
        ("Mis on 'eelarve' inglise keeles?", ["invoice", "budget", "profit", "loan"], "budget", "Eel (pre) + arve (bill)."),
        ("Mis on 'keskkond' inglise keeles?", ["centre", "community", "environment", "society"], "environment", "Keskkond means environment."),
        ("Mis on 'ettepanek' inglise keeles?", ["complaint", "question", "request", "proposal"], "proposal", "From ette panema, to put forward."),
        ("Mis on 'tööandja' inglise keeles?", ["employer", "employee", "colleague", "client"], "employer", "Töö (work) + andja (giver)."),
    ],
    [
        ("Mis on 'järjepidevus' inglise keeles?", ["patience", "consistency", "diligence", "accuracy"], "consistency", "Järjepidev means consistent."),
        ("Mis on 'läbirääkimised' inglise keeles?", ["negotiations", "interviews", "rumours", "lectures"], "negotiations", "Läbi rääkima, to talk through."),
        ("Mis on 'vastutustundlik' inglise keeles?", ["reliable", "sensitive", "responsible", "respectful"], "responsible", "Vastutus (responsibility) + tundlik (sensitive)."),
        ("Mis on 'eelarvamus' inglise keeles?", ["prediction", "assumption", "estimate", "prejudice"], "prejudice", "Eel (pre) + arvamus (opinion)."),
        ("Mis on 'kestlikkus' inglise keeles?", ["sustainability", "durability", "stability", "continuity"], "sustainability", "Kestlik means sustainable."),
    ],
    [
        ("Mis on 'kõhklematult' inglise keeles?", ["reluctantly", "unhesitatingly", "carelessly", "doubtfully"], "unhesitatingly", "Kõhklema (to hesitate) with the abessive -matu."),
        ("Mis on 'paratamatu' inglise keeles?", ["unexpected", "unbearable", "inevitable", "unnecessary"], "inevitable", "Paratamatu means inevitable."),
        ("Mis on 'sõnaosav' inglise keeles?", ["talkative", "silent", "polite", "eloquent"], "eloquent", "Sõna (word) + osav (skilful)."),
        ("Mis on 'tagasihoidlik' inglise keeles?", ["modest", "arrogant", "shy", "careful"], "modest", "Tagasi hoidma, to hold back."),
        ("Mis on 'põhjendamatu' inglise keeles?", ["unjustified", "unfounded", "unreasonable", "unexplained"], "unjustified", "Põhjendama (to justify) with -matu."),
    ],
];

const GRAMMAR: [[ChoiceRow; 5]; 6] = [
    [
        ("Ma elan ___ (Tallinn).", ["Tallinn", "Tallinnas", "Tallinnast", "Tallinnale"], "Tallinnas", "Inessive -s: where you live."),
        ("Mul on kaks ___ (kass).", ["kass", "kassi", "kassid", "kassil"], "kassi", "Numbers take the partitive singular."),
        ("Ma joon ___ (kohv).", ["kohv", "kohvi", "kohvis", "kohvile"], "kohvi", "Partitive for an unspecified amount."),
        ("Ta tuleb ___ (kool).", ["kool", "kooli", "koolis", "koolist"], "koolist", "Elative -st: coming out of somewhere."),
        ("Me läheme ___ (pood).", ["pood", "poodi", "poes", "poest"], "poodi", "Short illative: going into somewhere."),
    ],
    [
        ("Ma annan raamatu ___ (sõber).", ["sõber", "sõbra", "sõbrale", "sõbral"], "sõbrale", "Allative -le marks the receiver."),
        ("Meil ei ole ___ (aeg).", ["aeg", "aega", "ajal", "ajast"], "aega", "Negative existence takes the partitive."),
        ("Ta sõidab ___ (buss).", ["buss", "bussi", "bussiga", "bussis"], "bussiga", "Comitative -ga: by means of."),
        ("Lapsed mängivad ___ (aed).", ["aed", "aeda", "aias", "aiast"], "aias", "Inessive of aed is aias."),
        ("Ma ootan ___ (rong).", ["rong", "rongi", "rongil", "rongiga"], "rongi", "Ootama takes the partitive."),
    ],
    [
        ("Ta sai ___ (arst).", ["arst", "arsti", "arstiks", "arstina"], "arstiks", "Translative -ks: becoming something."),
        ("Ma töötan ___ (õpetaja).", ["õpetaja", "õpetajat", "õpetajaks", "õpetajana"], "õpetajana", "Essive -na: working as something."),
        ("Raamat on ___ (laud) peal.", ["laud", "laua", "lauda", "lauas"], "laua", "Postpositions take the genitive."),
        ("Ma lugesin raamatu ___ (lõpp).", ["lõpp", "lõpuni", "lõpus", "lõpule"], "lõpuni", "Terminative -ni: up to a point."),
        ("Ta läks tööle ilma ___ (vihmavari).", ["vihmavari", "vihmavarju", "vihmavarjuta", "vihmavarjuga"], "vihmavarjuta", "Abessive -ta: without."),
    ],
    [
        ("Ma ostsin turult ___ (õun).", ["õunad", "õunu", "õuntega", "õuntes"], "õunu", "Partitive plural for an indefinite quantity."),
        ("Ta rääkis oma ___ (plaanid).", ["plaanid", "plaane", "plaanidest", "plaanidele"], "plaanidest", "Rääkima takes the elative."),
        ("Need on ___ (suur) majad.", ["suur", "suured", "suuri", "suurte"], "suured", "Adjectives agree in number."),
        ("Ma kohtusin ___ (vana sõber).", ["vana sõbraga", "vanaga sõbraga", "vana sõber", "vanale sõbrale"], "vana sõbraga", "Only the noun takes -ga."),
        ("Lapsed mängisid ___ (mänguasjad).", ["mänguasjad", "mänguasju", "mänguasjadega", "mänguasjadele"], "mänguasjadega", "Comitative plural -dega."),
    ],
    [
        ("Vaatamata ___ (vihm) läksime välja.", ["vihm", "vihma", "vihmale", "vihmast"], "vihmale", "Vaatamata takes the allative."),
        ("Otsus tehti ___ (komisjon) poolt.", ["komisjon", "komisjoni", "komisjonile", "komisjonis"], "komisjoni", "Poolt takes the genitive."),
        ("Ta käitus ___ (laps) kombel.", ["laps", "lapse", "last", "lapsena"], "lapse", "Kombel takes the genitive."),
        ("Tänu ___ (sinu abi) saime hakkama.", ["sinu abi", "sinu abile", "sinu abist", "sinu abiga"], "sinu abile", "Tänu takes the allative."),
        ("Ta rääkis ___ (kõik) inimestega.", ["kõik", "kõiki", "kõigi", "kõigiga"], "kõigi", "Only the noun carries -ga; the attribute is genitive."),
    ],
    [
        ("Ma ei saanud aru, ___ (mis) räägiti.", ["mis", "mida", "millest", "millele"], "millest", "Rääkima takes the elative."),
        ("Hoolimata ___ (raskused) jätkasime.", ["raskused", "raskusi", "raskustest", "raskustele"], "raskustest", "Hoolimata takes the elative."),
        ("Eksam tuleb sooritada ___ (kuu) jooksul.", ["kuu", "kuud", "kuus", "kuule"], "kuu", "Jooksul takes the genitive."),
        ("Ta on tuntud ___ (luuletaja).", ["luuletaja", "luuletajat", "luuletajaks", "luuletajana"], "luuletajana", "Essive after tuntud."),
        ("Nad vaidlesid ___ (pisiasjad) üle.", ["pisiasjad", "pisiasju", "pisiasjade", "pisiasjadest"], "pisiasjade", "Üle takes the genitive plural here."),
    ],
];

const CONJUGATION: [[CompletionRow; 5]; 6] = [
    [
        ("Mina ___ (olema) õpetaja.", "olen", "present, 1st person singular", "Olema: olen, oled, on."),
        ("Sina ___ (elama) Tartus.", "elad", "present, 2nd person singular", "The -d ending marks sina."),
        ("Tema ___ (lugema) raamatut.", "loeb", "present, 3rd person singular", "Lugema has the weak stem loe-."),
        ("Meie ___ (sööma) leiba.", "sööme", "present, 1st person plural", "The -me ending marks meie."),
        ("Nemad ___ (rääkima) eesti keelt.", "räägivad", "present, 3rd person plural", "Rääkima has the weak stem räägi-."),
    ],
    [
        ("Eile ma ___ (käima) poes.", "käisin", "simple past, 1st person singular", "Past tense marker -si-."),
        ("Sina ___ (tegema) eile tööd.", "tegid", "simple past, 2nd person singular", "Tegema: tegin, tegid, tegi."),
        ("Ta ___ (minema) eile koju.", "läks", "simple past, 3rd person singular", "Minema has the irregular past läks."),
        ("Me ___ (ostma) eile piima.", "ostsime", "simple past, 1st person plural", "Past tense marker -si-."),
        ("Nad ___ (tulema) eile hilja.", "tulid", "simple past, 3rd person plural", "Tulema: tulin, tulid, tuli."),
    ],
    [
        ("Ma ei ___ (teadma) seda.", "tea", "present negative", "Negation uses the bare stem."),
        ("Ta ei ___ (tulema) eile.", "tulnud", "past negative", "Past negation uses the -nud participle."),
        ("Me oleme seda filmi ___ (nägema).", "näinud", "present perfect", "Nägema has the participle näinud."),
        ("Kas sa oled Tallinnas ___ (käima)?", "käinud", "present perfect", "Olema + -nud participle."),
        ("Nad ei ___ (jooma) kohvi.", "joo", "present negative", "Negation uses the bare stem."),
    ],
    [
        ("Ma ___ (tulema) hea meelega.", "tuleksin", "conditional, 1st person singular", "Conditional marker -ksi-."),
        ("Kui mul oleks aega, ma ___ (lugema) rohkem.", "loeksin", "conditional, 1st person singular", "Weak stem loe- + -ksin."),
        ("Ta ___ (tahtma) puhata.", "tahaks", "conditional, 3rd person singular", "Tahtma has the stem taha-."),
        ("Me ___ (minema) randa, kui ilm oleks ilus.", "läheksime", "conditional, 1st person plural", "Stem lähe- + -ksime."),
        ("Kas sa ___ (aitama) mind?", "aitaksid", "conditional, 2nd person singular", "Conditional for a polite request."),
    ],
    [
        ("Eestis ___ (rääkima) eesti keelt.", "räägitakse", "impersonal present", "Impersonal marker -takse."),
        ("Maja ___ (ehitama) eelmisel aastal.", "ehitati", "impersonal past", "Impersonal past marker -ti."),
        ("Siin ei ___ (suitsetama).", "suitsetata", "impersonal negative", "Negative impersonal ends in -ta."),
        ("Koosolek ___ (pidama) homme.", "peetakse", "impersonal present", "Pidama has the impersonal stem pee-."),
        ("Uks ___ (sulgema) kell kuus.", "suletakse", "impersonal present", "Sulgema has the stem sule-."),
    ],
    [
        ("Naaber ___ (olema) haige, nii räägitakse.", "olevat", "quotative", "Quotative -vat reports hearsay."),
        ("Ta ___ (tulema) kohe siia!", "tulgu", "jussive", "Jussive -gu gives a third-person order."),
        ("Ta lahkus sõnagi ___ (ütlema).", "ütlemata", "abessive infinitive", "The -mata form means without doing."),
        ("Nad ___ (teadma) vastust, kuid ma ei usu seda.", "teadvat", "quotative", "Quotative -vat reports hearsay."),
        ("Lapsed ___ (minema) magama!", "mingu", "jussive", "Minema has the jussive mingu."),
    ],
];

const WORD_REORDERING: [[ReorderRow; 5]; 6] = [
    [
        ("Ma elan Tallinnas.", &["Tallinnas elan ma"], "Subject, verb, place."),
        ("See on minu koer.", &[], "Copula sentence order."),
        ("Ma joon kohvi.", &["Kohvi joon ma"], "Subject, verb, object."),
        ("Täna on ilus ilm.", &["Ilm on täna ilus"], "The verb stays second."),
        ("Tema nimi on Mari.", &[], "Copula sentence order."),
    ],
    [
        ("Me läheme homme kinno.", &["Homme läheme me kinno"], "The verb stays second."),
        ("Ma sõidan tööle bussiga.", &["Ma sõidan bussiga tööle"], "Adverbials follow the verb."),
        ("Mu õde elab Tartus.", &[], "Subject, verb, place."),
        ("Eile sadas palju vihma.", &["Palju vihma sadas eile"], "Time first, then the verb."),
        ("Kas sa tuled täna?", &["Kas sa täna tuled"], "Kas opens a yes or no question."),
    ],
    [
        ("Ma õpin eesti keelt juba aasta.", &[], "Duration comes last."),
        ("Kui ilm on ilus, läheme randa.", &[], "The main clause verb follows the subordinate clause."),
        ("Ta ei tulnud eile tööle.", &["Eile ta ei tulnud tööle"], "Ei comes directly before the verb."),
        ("Me kohtusime kohvikus pärast tööd.", &["Pärast tööd kohtusime me kohvikus"], "The verb stays second."),
        ("Raamat, mida ma loen, on huvitav.", &[], "The relative clause follows its noun."),
    ],
    [
        ("Kui mul oleks aega, reisiksin rohkem.", &[], "Conditional clause first."),
        ("Ta ütles, et tuleb homme hiljem.", &[], "Et introduces reported speech."),
        ("Pärast tööd läksime sõpradega kinno.", &["Pärast tööd läksime kinno sõpradega"], "The verb stays second."),
        ("Ma oleksin tulnud, kui oleksin teadnud.", &[], "Past conditional in both clauses."),
        ("Seda raamatut on lugenud paljud inimesed.", &["Paljud inimesed on seda raamatut lugenud"], "Object fronted for emphasis."),
    ],
    [
        ("Vaatamata vihmale otsustasime siiski minna matkama.", &[], "Concessive phrase first."),
        ("Koosolek lükati edasi, sest juhataja oli haige.", &[], "Sest introduces the reason."),
        ("Eestis räägitakse peamiselt eesti ja vene keelt.", &[], "Impersonal verb in second position."),
        ("Tänu sinu abile saime projekti valmis.", &["Tänu sinu abile saime valmis projekti"], "Tänu phrase first, then the verb."),
        ("Ta väitis, et polnud sellest midagi kuulnud.", &[], "Negative past perfect in the subordinate clause."),
    ],
    [
        ("Hoolimata raskustest jätkasid teadlased oma uurimistööd visalt.", &["Hoolimata raskustest jätkasid teadlased visalt oma uurimistööd"], "Concessive phrase first."),
        ("Naaber olevat eile õhtul hilja koju jõudnud.", &[], "Quotative perfect."),
        ("Mida rohkem ma õpin, seda vähem ma tean.", &[], "Mida ... seda correlative."),
        ("Otsus tehti alles pärast pikki ja tuliseid vaidlusi.", &[], "Impersonal past with a long adverbial."),
        ("Kuigi ilm oli kehv, ei jäänud keegi koju.", &[], "Kuigi introduces the concession."),
    ],
];

const ERROR_DETECTION: [[ErrorRow; 5]; 6] = [
    [
        ("Ma lähevad kooli.", "lähevad", "Ma needs lähen."),
        ("Nad elab Tartus.", "elab", "Nad needs elavad."),
        ("Mul on kaks kass.", "kass", "Numbers take the partitive: kassi."),
        ("Ma joon kohv.", "kohv", "Joon takes the partitive: kohvi."),
        ("See on minu raamatud.", "raamatud", "See is singular: raamat."),
    ],
    [
        ("Eile ma lähen poodi.", "lähen", "Eile needs the past: läksin."),
        ("Ma annan raamatu sõber.", "sõber", "The receiver takes the allative: sõbrale."),
        ("Ta sõidab tööle bussil.", "bussil", "Means of travel takes -ga: bussiga."),
        ("Meil ei ole aeg.", "aeg", "Negative existence takes the partitive: aega."),
        ("Lapsed mängivad aedas.", "aedas", "The inessive of aed is aias."),
    ],
    [
        ("Ta sai arstina.", "arstina", "Becoming takes the translative: arstiks."),
        ("Ma ei tulin eile.", "tulin", "Past negation uses tulnud."),
        ("Me oleme seda filmi nägenud.", "nägenud", "The participle is näinud."),
        ("Raamat on laud peal.", "laud", "Peal takes the genitive: laua."),
        ("Ma ei teab vastust.", "teab", "Negation uses the bare stem: tea."),
    ],
    [
        ("Kui mul on aega, ma reisiksin rohkem.", "on", "Conditional clause needs oleks."),
        ("Ma ostsin poest kolm õunad.", "õunad", "Numbers take the partitive singular: õuna."),
        ("Ma kohtusin vanaga sõbraga.", "vanaga", "Only the noun takes -ga: vana sõbraga."),
        ("Ta rääkis oma plaanid.", "plaanid", "Rääkima takes the elative: plaanidest."),
        ("Need on suur majad.", "suur", "The adjective must be plural: suured."),
    ],
    [
        ("Vaatamata vihmast läksime välja.", "vihmast", "Vaatamata takes the allative: vihmale."),
        ("Eestis räägib eesti keelt.", "räägib", "A general statement needs the impersonal: räägitakse."),
        ("Maja ehitatakse eelmisel aastal.", "ehitatakse", "A past event needs ehitati."),
        ("Tänu sinu abist saime hakkama.", "abist", "Tänu takes the allative: abile."),
        ("Koosolek peetakse eile.", "peetakse", "Eile needs the past: peeti."),
    ],
    [
        ("Hoolimata raskustele jätkasime tööd.", "raskustele", "Hoolimata takes the elative: raskustest."),
        ("Naaber olevad haige.", "olevad", "The quotative is olevat."),
        ("Ta lahkus sõnagi ütlemati.", "ütlemati", "The abessive infinitive is ütlemata."),
        ("Nad vaidlesid pisiasjad üle.", "pisiasjad", "Üle takes the genitive: pisiasjade."),
        ("Las ta tulgub homme.", "tulgub", "The jussive is tulgu."),
    ],
];

const REORDER_PROMPT: &str = "Pane sõnad õigesse järjekorda.";
const ERROR_PROMPT: &str = "Leia lausest viga";

fn choice_item(row: &ChoiceRow) -> ExerciseItem {
    let (prompt, options, correct, explanation) = row;
    ExerciseItem::MultipleChoice(MultipleChoiceItem {
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_option: correct.to_string(),
        explanation: explanation.to_string(),
    })
}

fn completion_item(row: &CompletionRow) -> ExerciseItem {
    let (prompt, answer, hint, explanation) = row;
    ExerciseItem::Completion(CompletionItem {
        prompt: prompt.to_string(),
        correct_text: answer.to_string(),
        hint: hint.to_string(),
        explanation: explanation.to_string(),
    })
}

fn reorder_item(row: &ReorderRow) -> ExerciseItem {
    let (sentence, alternatives, explanation) = row;
    // Rotated by one word; none of the rows list that order as an answer
    let mut word_bag = text::words(sentence);
    word_bag.rotate_left(1);
    ExerciseItem::WordReordering(WordReorderingItem {
        prompt: REORDER_PROMPT.to_string(),
        word_bag,
        correct_sequence: sentence.to_string(),
        alternative_sequences: alternatives.iter().map(|a| a.to_string()).collect(),
        explanation: explanation.to_string(),
    })
}

fn error_item(row: &ErrorRow) -> ExerciseItem {
    let (sentence, faulty, explanation) = row;
    ExerciseItem::ErrorDetection(ErrorDetectionItem {
        prompt: format!("{}: '{}'", ERROR_PROMPT, sentence),
        candidate_spans: text::words(sentence),
        faulty_span: faulty.to_string(),
        explanation: explanation.to_string(),
    })
}

/// Hand-authored items for a category and tier
pub fn fallback_items(tier: ProficiencyTier, category: Category) -> Vec<ExerciseItem> {
    let rank = tier.rank();
    match category {
        Category::Vocabulary => VOCABULARY[rank].iter().map(choice_item).collect(),
        Category::Grammar => GRAMMAR[rank].iter().map(choice_item).collect(),
        Category::Conjugation => CONJUGATION[rank].iter().map(completion_item).collect(),
        Category::WordReordering => WORD_REORDERING[rank].iter().map(reorder_item).collect(),
        Category::ErrorDetection => ERROR_DETECTION[rank].iter().map(error_item).collect(),
    }
}

/// Static set for a category and tier, marked as fallback content
pub fn fallback_set(tier: ProficiencyTier, category: Category) -> ExerciseSet {
    ExerciseSet::new(tier, category, fallback_items(tier, category), Provenance::Fallback)
}
