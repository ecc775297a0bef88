// src/features/spelling.rs — Dictionary-based misspelling detection

use std::collections::HashSet;
use std::sync::OnceLock;

use strsim::levenshtein;

use super::trim_token;

/// A word counts as misspelled only when a dictionary entry sits within
/// this many edits; farther-off tokens are treated as names or jargon.
const MAX_EDIT_DISTANCE: usize = 2;

/// Tokens shorter than this are never checked.
const MIN_WORD_LEN: usize = 3;

/// Embedded dictionary, ordered by rough frequency so that ties in edit
/// distance resolve toward the more common word. ASCII lowercase.
const DICTIONARY_RAW: &str = "\
the of and a to in is you that it he was for on are as with his they i at be
this have from or one had by word but not what all were we when your can said
there use an each which she do how their if will up other about out many then
them these so some her would make like him into time has look two more write
go see number no way could people my than first water been call who oil its
now find long down day did get come made may part over new sound take only
little work know place year live me back give most very after thing our just
name good sentence man think say great where help through much before line
right too mean old any same tell boy follow came want show also around form
three small set put end does another well large must big even such because
turn here why ask went men read need land different home us move try kind
hand picture again change off play spell air away animal house point page
letter mother answer found study still learn should america world high every
near add food between own below country plant last school father keep tree
never start city earth eye light thought head under story saw left few while
along might close something seem next hard open example begin life always
those both paper together got group often run important until children side
feet car mile night walk white sea began grow took river four carry state
once book hear stop without second later miss idea enough eat face watch far
really almost let above girl sometimes mountain cut young talk soon list song
being leave family body music color stand sun question fish area mark dog
horse birds problem complete room knew since ever piece told usually friends
easy heard order red door sure become top ship across today during short
better best however low hours black products happened whole measure remember
early waves reached listen wind rock space covered fast several hold himself
toward five step morning passed vowel true hundred against pattern numeral
table north slowly money map farm pulled draw voice seen cold cried plan
notice south sing war ground fall king town unit figure certain field travel
wood fire upon done english road halt ten fly gave box finally wait correct
oh quickly person became shown minutes strong verb stars front feel fact
inches street decided contain contains course surface produce building ocean
class
note nothing rest carefully scientists inside wheels stay green known island
week less machine base ago stood plane system behind ran round boat game
force brought understand warm common bring explain dry though language shape
deep thousands yes clear equation yet government filled heat full hot check
object am rule among noun power cannot able six size dark ball material
special heavy fine pair circle include built
essay essays writing writer written paragraph paragraphs sentences argument
arguments evidence reason reasons reasoning support supporting supports
details examples conclusion conclusions introduction topic topics thesis
analysis analyze author authors text texts reader readers audience purpose
persuade persuasive convince convinced opinion opinions agree disagree
discuss discussion describe describes description explained explanation
summary summarize compare comparison contrast effect effects affect affects
cause causes claim claims source sources quote quotes research article
articles organize organized structure develop development developed focus
clarity grammar spelling punctuation vocabulary tone style revise revision
draft edit editing education educational students student teacher teachers
learning classroom classrooms computer computers technology technologies
internet library libraries books censorship censored patience patient
patiently narrative narratives memoir memoirs historical history societies
society benefit benefits distraction distractions information knowledge
skill skills communication communicate experience experiences exercise
health healthy online offensive material materials shelves shelf remove
removed removing parent parents adult adults community communities modern
access devices device screen screens social media websites website email
messages message games entertainment attention learned lesson lessons
improve improved improving improvement practice practiced practicing effort
efforts succeed success successful challenge challenges challenging
difficult difficulty overcome achieve achieved achievement goal goals
future careers career job jobs opportunity opportunities valuable value
responsibility responsible freedom choice choices choose chosen decision
decisions decide argue argued arguing position positions viewpoint view
views perspective perspectives belief beliefs believe believed believes
understanding understood respect respected important importance necessary
needs needed wants wanted situation situations environment world wide
therefore furthermore moreover although thus hence additionally
consequently nevertheless meanwhile instead otherwise specifically
generally overall despite regarding example examples particular particularly
jump jumps jumped jumping runs running walked walking talked talking played
playing helped helping used using makes making goes going comes coming
takes taking gives giving finds finding keeps keeping likes liked loved
loving says saying tells telling asks asked feels feeling felt leaves
thinks thinking knows knowing shows showing means meant reading writes
wrote spoke speak speaking spoken listened watches watched watching
quick brown fox lazy test tests tested everywhere anywhere somewhere
nobody everybody someone anyone everyone anything everything multiple
quiet quietly places placed location located moment moments minute hour
misspelled misspell misspelling spelled
happy happiness sad sadness angry afraid proud excited nervous worried
interesting interested boring bored amazing wonderful terrible awful
beautiful perfect excellent fantastic brilliant positive negative
fear fears care cares works working daily smart joy kids kid tools tool
habits habit schools plans
dont cant wont isnt arent wasnt werent hasnt havent hadnt doesnt didnt
couldnt wouldnt shouldnt thats whats theres heres youre youve youll theyre
theyve weve ive im hes shes lets
don't can't won't isn't aren't wasn't weren't hasn't haven't hadn't doesn't
didn't couldn't wouldn't shouldn't that's what's there's here's you're
you've you'll they're they've we've i've i'm he's she's it's let's";

fn dictionary() -> &'static Vec<&'static str> {
    static LIST: OnceLock<Vec<&'static str>> = OnceLock::new();
    LIST.get_or_init(|| DICTIONARY_RAW.split_whitespace().collect())
}

fn known_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| dictionary().iter().copied().collect())
}

pub fn is_known(word: &str) -> bool {
    known_words().contains(word)
}

/// Closest dictionary entry within [`MAX_EDIT_DISTANCE`] of an unknown
/// word. Returns `None` for known words, empty input, and tokens with no
/// nearby entry. Distance ties resolve to the earlier (more frequent)
/// dictionary entry.
pub fn nearest_correction(word: &str) -> Option<&'static str> {
    if word.is_empty() || is_known(word) {
        return None;
    }

    let wlen = word.chars().count();
    let mut best: Option<(usize, &'static str)> = None;
    for &entry in dictionary() {
        if entry.len().abs_diff(wlen) > MAX_EDIT_DISTANCE {
            continue;
        }
        let distance = levenshtein(word, entry);
        if distance <= MAX_EDIT_DISTANCE && best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, entry));
            if distance == 1 {
                // unknown words can never reach distance zero
                break;
            }
        }
    }
    best.map(|(_, entry)| entry)
}

/// Count tokens that look like misspellings: lowercased, stripped of
/// surrounding punctuation, at least [`MIN_WORD_LEN`] characters, absent
/// from the dictionary but with a correction nearby.
pub fn count_misspellings(text: &str) -> usize {
    let lower = text.to_lowercase();
    lower
        .split_whitespace()
        .map(trim_token)
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .filter(|w| nearest_correction(w).is_some())
        .count()
}
